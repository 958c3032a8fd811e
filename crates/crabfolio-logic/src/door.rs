//! Door progression: a strictly linear password state machine.
//!
//! `stage` runs from 0 to N (the password count). A submission is compared
//! against `passwords[stage]` only; later secrets are never accepted early.
//! Each accepted stage delivers one mail to the inbox counter.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{DOUBLE_MAIL_AT, DOOR_PASSWORDS, INITIAL_MAIL_COUNT};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DoorError {
    #[error("incorrect password for stage {stage} of {total}")]
    IncorrectPassword { stage: usize, total: usize },
    #[error("door already unlocked ({total} of {total} stages)")]
    AlreadyComplete { total: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoorStatus {
    pub stage: usize,
    pub total: usize,
    pub unlocked: bool,
}

/// Result of an accepted submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageAdvance {
    pub new_stage: usize,
    pub unlocked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoorProgression {
    passwords: Vec<String>,
    stage: usize,
    mail_count: u32,
}

impl DoorProgression {
    pub fn new(passwords: Vec<String>) -> Self {
        Self {
            passwords,
            stage: 0,
            mail_count: INITIAL_MAIL_COUNT,
        }
    }

    /// Restore saved progress. `None` if `stage` exceeds the password count.
    pub fn resume(passwords: Vec<String>, stage: usize, mail_count: u32) -> Option<Self> {
        if stage > passwords.len() {
            return None;
        }
        Some(Self {
            passwords,
            stage,
            mail_count,
        })
    }

    pub fn status(&self) -> DoorStatus {
        DoorStatus {
            stage: self.stage,
            total: self.total(),
            unlocked: self.is_unlocked(),
        }
    }

    pub fn submit(&mut self, password: &str) -> Result<StageAdvance, DoorError> {
        let total = self.total();
        let expected = self
            .passwords
            .get(self.stage)
            .ok_or(DoorError::AlreadyComplete { total })?;
        if password != expected.as_str() {
            return Err(DoorError::IncorrectPassword {
                stage: self.stage,
                total,
            });
        }
        self.stage += 1;
        if self.mail_count == DOUBLE_MAIL_AT {
            self.mail_count += 1;
        }
        self.mail_count += 1;
        Ok(StageAdvance {
            new_stage: self.stage,
            unlocked: self.is_unlocked(),
        })
    }

    pub fn stage(&self) -> usize {
        self.stage
    }

    pub fn total(&self) -> usize {
        self.passwords.len()
    }

    pub fn is_unlocked(&self) -> bool {
        self.stage == self.passwords.len()
    }

    /// Mails received so far: the welcome mail, one per cleared stage, and
    /// a bonus on the stage cleared with two mails already in.
    pub fn mail_count(&self) -> u32 {
        self.mail_count
    }
}

impl Default for DoorProgression {
    fn default() -> Self {
        Self::new(DOOR_PASSWORDS.iter().map(|p| p.to_string()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn five_in_order_unlocks_then_rejects() {
        let mut door = DoorProgression::default();
        for (i, pw) in DOOR_PASSWORDS.iter().enumerate() {
            let adv = door.submit(pw).unwrap();
            assert_eq!(adv.new_stage, i + 1);
            assert_eq!(adv.unlocked, i == 4);
            assert_eq!(door.status().unlocked, i == 4);
        }
        assert_eq!(
            door.submit(DOOR_PASSWORDS[0]),
            Err(DoorError::AlreadyComplete { total: 5 })
        );
        assert_eq!(door.stage(), 5);
    }

    #[test]
    fn skipping_ahead_is_rejected() {
        let mut door = DoorProgression::default();
        assert_eq!(
            door.submit(DOOR_PASSWORDS[2]),
            Err(DoorError::IncorrectPassword { stage: 0, total: 5 })
        );
        assert_eq!(door.stage(), 0);
    }

    #[test]
    fn earlier_password_rejected_later() {
        let mut door = DoorProgression::default();
        door.submit(DOOR_PASSWORDS[0]).unwrap();
        door.submit(DOOR_PASSWORDS[1]).unwrap();
        assert!(door.submit(DOOR_PASSWORDS[0]).is_err());
        assert_eq!(door.stage(), 2);
    }

    #[test]
    fn comparison_is_exact() {
        let mut door = DoorProgression::default();
        assert!(door.submit(" cr4b_m4st3r_2025").is_err());
        assert!(door.submit("CR4B_M4ST3R_2025").is_err());
        assert_eq!(door.stage(), 0);
    }

    #[test]
    fn mail_arrives_per_stage() {
        let mut door = DoorProgression::default();
        assert_eq!(door.mail_count(), 1);
        let _ = door.submit("wrong");
        assert_eq!(door.mail_count(), 1);
        door.submit(DOOR_PASSWORDS[0]).unwrap();
        assert_eq!(door.mail_count(), 2);
    }

    #[test]
    fn second_stage_skips_mail_three() {
        let mut door = DoorProgression::default();
        let counts: Vec<u32> = DOOR_PASSWORDS
            .iter()
            .map(|pw| {
                door.submit(pw).unwrap();
                door.mail_count()
            })
            .collect();
        assert_eq!(counts, vec![2, 4, 5, 6, 7]);
    }

    #[test]
    fn resume_validates_stage() {
        let pw: Vec<String> = vec!["a".into(), "b".into()];
        assert!(DoorProgression::resume(pw.clone(), 3, 1).is_none());
        let door = DoorProgression::resume(pw, 2, 3).unwrap();
        assert!(door.is_unlocked());
        assert_eq!(door.mail_count(), 3);
    }

    #[test]
    fn empty_password_list_is_already_unlocked() {
        let mut door = DoorProgression::new(vec![]);
        assert!(door.status().unlocked);
        assert_eq!(door.submit("x"), Err(DoorError::AlreadyComplete { total: 0 }));
    }
}
