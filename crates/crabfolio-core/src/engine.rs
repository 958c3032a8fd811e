//! Session engine - main entry point for driving the office scene.
//!
//! Tick order:
//! 1. Character controller (input → resolved transform)
//! 2. Proximity selection on the just-moved position, highlight pass
//! 3. Interact edge trigger → action dispatch (discoveries re-check unlocks)
//! 4. Safety-net unlock poll (every few seconds)
//! 5. Idle detection
//! 6. Publish the crab snapshot into the world
//!
//! All progression state (discoveries, unlocks, door, keypad, counters) is
//! owned here and mutated only through the methods below.

use std::collections::VecDeque;

use hecs::{Entity, World};

use crabfolio_logic::discovery::{CatalogProgress, DiscoverySet};
use crabfolio_logic::door::{DoorError, DoorProgression, DoorStatus, StageAdvance};
use crabfolio_logic::easter_eggs::{IdentityQueryCounter, IdleTracker, KonamiTracker, MugCounter};
use crabfolio_logic::geometry::Vec3;
use crabfolio_logic::input::{joystick_direction, KeyboardLayout, KeyboardState};
use crabfolio_logic::keypad::{KeypadFeedback, SecurityKeypad};
use crabfolio_logic::movement::{CharacterController, CrabSnapshot, MovementMode};
use crabfolio_logic::proximity::{Highlight, InteractTrigger, ProximityIndex};
use crabfolio_logic::unlocks::{AccessoryId, UnlockError, UnlockPoller, UnlockProgress, UnlockRegistry};

use crate::components::WornAccessory;
use crate::persistence::{self, ProgressSave, SaveError};
use crate::scene::{spawn_scene, InteractionAction, SceneConfig, SceneError};
use crate::systems::{collect_groups, highlight_system, mesh_highlight, publish_snapshot};

/// A fired interaction, handed to the tick callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interaction {
    pub group: String,
    pub action: InteractionAction,
}

/// Notable state changes, queued until [`SessionEngine::drain_events`].
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Interacted(Interaction),
    Discovered(String),
    AccessoryUnlocked(AccessoryId),
    DoorStageAdvanced { stage: usize, total: usize, unlocked: bool },
    MailReceived { count: u32 },
    KeypadGranted,
    KeypadDenied,
    LampToggled { on: bool },
    MainLightsToggled { on: bool },
    KonamiActivated,
    Dance,
    Yawn,
}

/// What happened during one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub snapshot: CrabSnapshot,
    pub selected: Option<String>,
    pub activated: Option<Interaction>,
    pub unlocked: Vec<AccessoryId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneToggles {
    pub lamp_on: bool,
    pub main_lights_on: bool,
}

impl Default for SceneToggles {
    fn default() -> Self {
        Self {
            lamp_on: false,
            main_lights_on: true,
        }
    }
}

/// Main session engine
pub struct SessionEngine {
    /// ECS world holding meshes, obstacles and the crab
    pub world: World,
    crab: Entity,
    scene: SceneConfig,
    controller: CharacterController,
    proximity: Option<ProximityIndex>,
    trigger: InteractTrigger,
    selected: Option<String>,

    // Input
    layout: KeyboardLayout,
    keyboard: KeyboardState,
    joystick: Option<Vec3>,

    // Progression
    discovery: DiscoverySet,
    unlocks: UnlockRegistry,
    poller: UnlockPoller,
    door: DoorProgression,
    keypad: SecurityKeypad,
    toggles: SceneToggles,

    // Easter eggs
    konami: KonamiTracker,
    whoami: IdentityQueryCounter,
    mugs: MugCounter,
    idle: IdleTracker,

    events: VecDeque<SessionEvent>,
    session_time: f64,
    tick_count: u64,
}

impl SessionEngine {
    /// Build a session over a validated scene.
    pub fn new(scene: SceneConfig) -> Result<Self, SceneError> {
        scene.validate()?;
        let mut world = World::new();
        let crab = spawn_scene(&mut world, &scene);
        let controller = CharacterController::new(
            scene.crab_start,
            scene.bounds,
            scene.obstacle_boxes(),
            scene.movement.clone(),
        );
        log::info!(
            "scene '{}' loaded: {} obstacles, {} groups, {} meshes",
            scene.name,
            scene.obstacles.len(),
            scene.groups.len(),
            scene.meshes.len()
        );
        Ok(Self {
            world,
            crab,
            controller,
            proximity: None,
            trigger: InteractTrigger::new(),
            selected: None,
            layout: KeyboardLayout::default(),
            keyboard: KeyboardState::default(),
            joystick: None,
            discovery: DiscoverySet::new(),
            unlocks: UnlockRegistry::new(),
            poller: UnlockPoller::new(scene.interaction.unlock_poll_seconds),
            door: DoorProgression::new(scene.door_passwords.clone()),
            keypad: SecurityKeypad::new(scene.keypad_code.clone()),
            toggles: SceneToggles::default(),
            konami: KonamiTracker::new(),
            whoami: IdentityQueryCounter::default(),
            mugs: MugCounter::default(),
            idle: IdleTracker::new(scene.interaction.idle_seconds),
            events: VecDeque::new(),
            session_time: 0.0,
            tick_count: 0,
            scene,
        })
    }

    /// Session over the built-in office scene.
    pub fn office() -> Result<Self, SceneError> {
        Self::new(SceneConfig::office()?)
    }

    // --- Input ---

    /// Switch keyboard layout. Held keys are released since their names
    /// may map to nothing under the new layout.
    pub fn set_layout(&mut self, layout: KeyboardLayout) {
        if layout != self.layout {
            self.keyboard.clear();
        }
        self.layout = layout;
    }

    pub fn layout(&self) -> KeyboardLayout {
        self.layout
    }

    /// Key-down event (DOM key names). Also feeds the Konami tracker.
    pub fn key_down(&mut self, key: &str) {
        self.keyboard.key_down(self.layout, key);
        if self.konami.press(key) {
            log::info!("konami code entered");
            self.events.push_back(SessionEvent::KonamiActivated);
        }
    }

    pub fn key_up(&mut self, key: &str) {
        self.keyboard.key_up(self.layout, key);
    }

    /// Window lost focus: release every key and the joystick.
    pub fn blur(&mut self) {
        self.keyboard.clear();
        self.joystick = None;
    }

    /// Raw joystick reading; inside the dead zone control returns to the keyboard.
    pub fn set_joystick(&mut self, x: f32, y: f32) {
        self.joystick = joystick_direction(x, y);
    }

    pub fn release_joystick(&mut self) {
        self.joystick = None;
    }

    // --- Tick ---

    pub fn tick(&mut self, delta_seconds: f32) -> TickReport {
        self.tick_with(delta_seconds, |_| {})
    }

    /// Advance one frame. `on_interact` runs synchronously when an
    /// interaction fires.
    pub fn tick_with<F>(&mut self, delta_seconds: f32, mut on_interact: F) -> TickReport
    where
        F: FnMut(&Interaction),
    {
        self.tick_count += 1;
        self.session_time += f64::from(delta_seconds.max(0.0));

        // T0: Movement
        let input = self.keyboard.move_input(self.joystick);
        let mut snapshot = self.controller.update(&input, delta_seconds);
        if snapshot.mode == MovementMode::Walking {
            self.idle.touch(self.session_time);
        }

        // T0: Proximity + highlight (after movement)
        let selected = self.proximity_index().nearest(snapshot.position).map(|s| s.key);
        if selected != self.selected {
            log::trace!("selection {:?} -> {:?}", self.selected, selected);
        }
        highlight_system(&mut self.world, selected.as_deref());
        self.selected = selected;

        // T0: Interaction
        let mut unlocked = Vec::new();
        let fired = self.trigger.update(self.keyboard.interact, self.selected.as_deref());
        let activated = match fired {
            Some(group) => {
                let interaction = self.dispatch(&group, &mut unlocked);
                if let Some(interaction) = &interaction {
                    on_interact(interaction);
                    if snapshot.mode != MovementMode::Walking {
                        snapshot.mode = MovementMode::Interacting;
                    }
                }
                interaction
            }
            None => None,
        };

        // T1: Unlock poll
        if self.poller.tick(delta_seconds.max(0.0)) {
            unlocked.extend(self.check_all());
        }

        // T1: Idle
        if self.idle.poll_yawn(self.session_time) {
            log::debug!("crab idle for {:.0}s", self.session_time - self.idle.last_activity());
            self.events.push_back(SessionEvent::Yawn);
        }

        publish_snapshot(&mut self.world, self.crab, snapshot);

        TickReport {
            snapshot,
            selected: self.selected.clone(),
            activated,
            unlocked,
        }
    }

    /// Group positions are gathered from the world on first use.
    fn proximity_index(&mut self) -> &ProximityIndex {
        let (world, scene, keypad) = (&self.world, &self.scene, &self.keypad);
        self.proximity.get_or_insert_with(|| {
            let groups = collect_groups(world, &scene.groups, keypad.is_granted());
            ProximityIndex::new(groups, scene.interaction.activation_radius)
        })
    }

    fn dispatch(&mut self, group: &str, unlocked: &mut Vec<AccessoryId>) -> Option<Interaction> {
        let Some(def) = self.scene.group(group) else {
            log::warn!("activated unknown group '{group}'");
            return None;
        };
        let action = def.action;
        let discovers = def.discovers.clone();
        log::debug!("interact '{}' -> {}", group, action.as_str());

        self.idle.touch(self.session_time);
        match action {
            InteractionAction::Coffee => {
                if self.mugs.click() {
                    self.events.push_back(SessionEvent::Dance);
                }
            }
            InteractionAction::ToggleLamp => {
                self.toggles.lamp_on = !self.toggles.lamp_on;
                self.events.push_back(SessionEvent::LampToggled {
                    on: self.toggles.lamp_on,
                });
            }
            InteractionAction::ToggleMainLights => {
                self.toggles.main_lights_on = !self.toggles.main_lights_on;
                self.events.push_back(SessionEvent::MainLightsToggled {
                    on: self.toggles.main_lights_on,
                });
            }
            InteractionAction::Terminal
            | InteractionAction::OpenCv
            | InteractionAction::OpenPanel
            | InteractionAction::OpenKeypad
            | InteractionAction::Endgame
            | InteractionAction::Inspect => {}
        }

        let interaction = Interaction {
            group: group.to_string(),
            action,
        };
        self.events.push_back(SessionEvent::Interacted(interaction.clone()));
        if let Some(id) = discovers {
            if self.discovery.discover(&id) {
                log::info!("discovered '{id}' ({}/{})", self.discovery.size(), self.scene.catalog.len());
                self.events.push_back(SessionEvent::Discovered(id));
                unlocked.extend(self.check_all());
            }
        }
        Some(interaction)
    }

    // --- Discovery ---

    /// Record a discovery from outside the interaction path (e.g. a UI panel).
    /// Unlocks are re-checked immediately.
    pub fn discover(&mut self, id: &str) -> bool {
        if !self.discovery.discover(id) {
            return false;
        }
        log::info!("discovered '{id}' ({}/{})", self.discovery.size(), self.scene.catalog.len());
        self.events.push_back(SessionEvent::Discovered(id.to_string()));
        self.check_all();
        true
    }

    pub fn is_discovered(&self, id: &str) -> bool {
        self.discovery.is_discovered(id)
    }

    pub fn discovery(&self) -> &DiscoverySet {
        &self.discovery
    }

    pub fn catalog_progress(&self) -> CatalogProgress {
        self.discovery.progress(&self.scene.catalog_ids())
    }

    // --- Unlocks ---

    /// Evaluate every computed unlock condition. Idempotent.
    pub fn check_all(&mut self) -> Vec<AccessoryId> {
        let granted = self.unlocks.check_all(&self.discovery, self.scene.catalog.len());
        for id in &granted {
            log::info!("accessory unlocked: {id}");
            self.events.push_back(SessionEvent::AccessoryUnlocked(*id));
        }
        granted
    }

    /// External unlock signal. Returns false if already unlocked.
    pub fn grant_accessory(&mut self, id: AccessoryId) -> bool {
        if !self.unlocks.grant(id) {
            return false;
        }
        log::info!("accessory unlocked: {id}");
        self.events.push_back(SessionEvent::AccessoryUnlocked(id));
        true
    }

    pub fn is_unlocked(&self, id: AccessoryId) -> bool {
        self.unlocks.is_unlocked(id)
    }

    pub fn unlock_progress(&self, id: AccessoryId) -> UnlockProgress {
        self.unlocks.progress(id, &self.discovery, self.scene.catalog.len())
    }

    pub fn equip(&mut self, id: Option<AccessoryId>) -> Result<(), UnlockError> {
        self.unlocks.equip(id)?;
        match self.world.get::<&mut WornAccessory>(self.crab) {
            Ok(mut worn) => worn.0 = id,
            Err(e) => log::warn!("crab entity has no accessory slot: {e}"),
        }
        Ok(())
    }

    pub fn equipped(&self) -> Option<AccessoryId> {
        self.unlocks.equipped()
    }

    // --- Door ---

    pub fn door_status(&self) -> DoorStatus {
        self.door.status()
    }

    pub fn submit_password(&mut self, password: &str) -> Result<StageAdvance, DoorError> {
        match self.door.submit(password) {
            Ok(advance) => {
                let total = self.door.total();
                log::info!("door stage {}/{} cleared", advance.new_stage, total);
                self.events.push_back(SessionEvent::DoorStageAdvanced {
                    stage: advance.new_stage,
                    total,
                    unlocked: advance.unlocked,
                });
                self.events.push_back(SessionEvent::MailReceived {
                    count: self.door.mail_count(),
                });
                Ok(advance)
            }
            Err(e) => {
                log::info!("door submission rejected: {e}");
                Err(e)
            }
        }
    }

    pub fn mail_count(&self) -> u32 {
        self.door.mail_count()
    }

    // --- Keypad ---

    pub fn keypad_press(&mut self, button: char) -> KeypadFeedback {
        let feedback = self.keypad.press(button);
        match feedback {
            KeypadFeedback::Granted => {
                log::info!("security keypad: access granted");
                self.enable_gated_groups();
                self.events.push_back(SessionEvent::KeypadGranted);
            }
            KeypadFeedback::Denied => {
                log::info!("security keypad: access denied");
                self.events.push_back(SessionEvent::KeypadDenied);
            }
            KeypadFeedback::Pending | KeypadFeedback::Ignored => {}
        }
        feedback
    }

    pub fn keypad_clear(&mut self) {
        self.keypad.clear();
    }

    pub fn keypad_granted(&self) -> bool {
        self.keypad.is_granted()
    }

    fn enable_gated_groups(&mut self) {
        let Some(index) = self.proximity.as_mut() else {
            // Built lazily with the right gating on next tick.
            return;
        };
        for def in self.scene.groups.iter().filter(|g| g.requires_keypad) {
            index.set_enabled(&def.key, true);
        }
    }

    // --- Easter eggs ---

    /// One `whoami` in the terminal. Returns true when it earned the crisis hat.
    pub fn whoami(&mut self) -> bool {
        self.whoami.query() && self.grant_accessory(AccessoryId::HatCrisis)
    }

    pub fn whoami_count(&self) -> u32 {
        self.whoami.count()
    }

    pub fn konami_activated(&self) -> bool {
        self.konami.is_activated()
    }

    pub fn mug_count(&self) -> u32 {
        self.mugs.count()
    }

    pub fn should_dance(&self) -> bool {
        self.mugs.should_dance()
    }

    pub fn is_idle(&self) -> bool {
        self.idle.is_idle(self.session_time)
    }

    pub fn toggles(&self) -> SceneToggles {
        self.toggles
    }

    // --- Queries ---

    /// Snapshot published by the last tick.
    pub fn snapshot(&self) -> CrabSnapshot {
        self.world
            .get::<&CrabSnapshot>(self.crab)
            .map(|s| *s)
            .unwrap_or_else(|_| self.controller.snapshot())
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn mesh_highlight(&self, mesh: &str) -> Option<Highlight> {
        mesh_highlight(&self.world, mesh)
    }

    pub fn worn_accessory(&self) -> Option<AccessoryId> {
        self.world.get::<&WornAccessory>(self.crab).ok().and_then(|w| w.0)
    }

    pub fn scene(&self) -> &SceneConfig {
        &self.scene
    }

    pub fn controller(&self) -> &CharacterController {
        &self.controller
    }

    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        self.events.drain(..).collect()
    }

    pub fn session_time(&self) -> f64 {
        self.session_time
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    // --- Save / load ---

    /// Save progression to a writer
    pub fn save<W: std::io::Write>(&self, writer: W) -> Result<(), SaveError> {
        let save = ProgressSave {
            version: persistence::SAVE_VERSION,
            scene_name: self.scene.name.clone(),
            password_count: self.door.total(),
            discovery: self.discovery.clone(),
            unlocks: self.unlocks.clone(),
            door_stage: self.door.stage(),
            mail_count: self.door.mail_count(),
            keypad_granted: self.keypad.is_granted(),
            lamp_on: self.toggles.lamp_on,
            main_lights_on: self.toggles.main_lights_on,
            konami: self.konami.clone(),
            whoami: self.whoami.clone(),
            mugs: self.mugs.clone(),
        };
        persistence::save_progress(writer, &save)?;
        log::info!(
            "progress saved: {} discoveries, door stage {}/{}",
            self.discovery.size(),
            self.door.stage(),
            self.door.total()
        );
        Ok(())
    }

    /// Load progression from a reader. The scene and crab position are kept.
    pub fn load<R: std::io::Read>(&mut self, reader: R) -> Result<(), SaveError> {
        let save = persistence::load_progress(reader)?;
        let expected = self.door.total();
        if save.password_count != expected {
            return Err(SaveError::SceneMismatch {
                expected,
                found: save.password_count,
            });
        }
        let door = DoorProgression::resume(self.scene.door_passwords.clone(), save.door_stage, save.mail_count)
            .ok_or(SaveError::InvalidStage {
                stage: save.door_stage,
                total: expected,
            })?;

        let mut keypad = SecurityKeypad::new(self.scene.keypad_code.clone());
        if save.keypad_granted {
            keypad.mark_granted();
        }

        self.discovery = save.discovery;
        self.unlocks = save.unlocks;
        self.door = door;
        self.keypad = keypad;
        self.toggles = SceneToggles {
            lamp_on: save.lamp_on,
            main_lights_on: save.main_lights_on,
        };
        self.konami = save.konami;
        self.whoami = save.whoami;
        self.mugs = save.mugs;

        // Rebuild derived state
        self.proximity = None;
        self.trigger = InteractTrigger::new();
        self.poller = UnlockPoller::new(self.scene.interaction.unlock_poll_seconds);
        let equipped = self.unlocks.equipped();
        if let Ok(mut worn) = self.world.get::<&mut WornAccessory>(self.crab) {
            worn.0 = equipped;
        }
        // Saves may predate a grant the restored discoveries already earn
        self.check_all();

        log::info!(
            "progress loaded from scene '{}': {} discoveries, door stage {}/{}",
            save.scene_name,
            self.discovery.size(),
            self.door.stage(),
            expected
        );
        Ok(())
    }
}
