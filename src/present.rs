//! Presentation-layer interface
//!
//! The simulation never touches a scene graph. Each step returns a list of
//! [`Command`]s keyed by simulation-side entity IDs; a [`VisualBridge`]
//! replays them against any [`Presentation`] implementation and keeps the
//! entity → visual handle mapping.

use std::collections::HashMap;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::sim::{EntityId, ObstacleKind};

/// Named palette colours
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    Orange,
    Gray,
    Red,
    Green,
    Brown,
    Blue,
    Azure,
    Cyan,
    Turquoise,
}

/// Surface parameters of a visual
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub color: Color,
    /// Opacity (0-1)
    pub alpha: f32,
}

impl Material {
    pub fn opaque(color: Color) -> Self {
        Self { color, alpha: 1.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub scale: Vec3,
}

/// What the presentation layer should build for an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VisualKind {
    Player,
    Obstacle(ObstacleKind),
    RoadSegment,
    WaterParticle,
}

/// Property a timed animation drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnimatedProperty {
    /// Vertical position
    Y,
}

/// Easing curves for timed animations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Easing {
    Linear,
    #[default]
    OutQuad,
}

impl Easing {
    /// Map normalized time (clamped to 0-1) to normalized progress
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::OutQuad => 1.0 - (1.0 - t) * (1.0 - t),
        }
    }
}

/// HUD text slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HudField {
    Score,
    Lives,
}

impl HudField {
    /// Render the HUD label for a value
    pub fn format(self, value: impl std::fmt::Display) -> String {
        match self {
            HudField::Score => format!("Score: {value}"),
            HudField::Lives => format!("Lives: {value}"),
        }
    }
}

/// A single instruction for the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    Spawn {
        entity: EntityId,
        kind: VisualKind,
        transform: Transform,
        material: Material,
    },
    Move {
        entity: EntityId,
        position: Vec3,
    },
    Destroy {
        entity: EntityId,
    },
    Animate {
        entity: EntityId,
        property: AnimatedProperty,
        target: f32,
        duration: f32,
        easing: Easing,
    },
    Hud {
        field: HudField,
        text: String,
    },
    GameOver,
}

/// Opaque reference to a visual owned by the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VisualHandle(pub u64);

/// Minimal surface the simulation needs from an engine
pub trait Presentation {
    fn spawn_visual(
        &mut self,
        kind: VisualKind,
        transform: &Transform,
        material: &Material,
    ) -> VisualHandle;
    fn update_visual_transform(&mut self, handle: VisualHandle, position: Vec3);
    fn destroy_visual(&mut self, handle: VisualHandle);
    fn play_timed_animation(
        &mut self,
        handle: VisualHandle,
        property: AnimatedProperty,
        target: f32,
        duration: f32,
        easing: Easing,
    );
    fn update_hud_text(&mut self, field: HudField, text: &str);
    fn on_game_over(&mut self);
}

/// Replays simulation commands against a presentation layer
#[derive(Debug, Default)]
pub struct VisualBridge {
    handles: HashMap<EntityId, VisualHandle>,
}

impl VisualBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle currently bound to an entity
    pub fn handle(&self, entity: EntityId) -> Option<VisualHandle> {
        self.handles.get(&entity).copied()
    }

    /// Number of entities with a live visual
    pub fn live_count(&self) -> usize {
        self.handles.len()
    }

    /// Apply commands in order
    pub fn apply<P: Presentation + ?Sized>(&mut self, commands: &[Command], presenter: &mut P) {
        for command in commands {
            match command {
                Command::Spawn {
                    entity,
                    kind,
                    transform,
                    material,
                } => {
                    let handle = presenter.spawn_visual(*kind, transform, material);
                    if let Some(stale) = self.handles.insert(*entity, handle) {
                        log::warn!("Entity {entity} respawned, dropping stale visual {stale:?}");
                        presenter.destroy_visual(stale);
                    }
                }
                Command::Move { entity, position } => match self.handles.get(entity) {
                    Some(&handle) => presenter.update_visual_transform(handle, *position),
                    None => log::warn!("Move for unknown entity {entity}"),
                },
                Command::Destroy { entity } => match self.handles.remove(entity) {
                    Some(handle) => presenter.destroy_visual(handle),
                    None => log::warn!("Destroy for unknown entity {entity}"),
                },
                Command::Animate {
                    entity,
                    property,
                    target,
                    duration,
                    easing,
                } => match self.handles.get(entity) {
                    Some(&handle) => presenter.play_timed_animation(
                        handle, *property, *target, *duration, *easing,
                    ),
                    None => log::warn!("Animate for unknown entity {entity}"),
                },
                Command::Hud { field, text } => presenter.update_hud_text(*field, text),
                Command::GameOver => presenter.on_game_over(),
            }
        }
    }
}

/// A visual tracked by [`HeadlessPresentation`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadlessVisual {
    pub kind: VisualKind,
    pub position: Vec3,
}

/// In-memory presentation layer for headless runs and tests
#[derive(Debug, Default)]
pub struct HeadlessPresentation {
    next_handle: u64,
    pub visuals: HashMap<VisualHandle, HeadlessVisual>,
    pub hud: HashMap<HudField, String>,
    pub animations_played: u32,
    pub game_over_count: u32,
}

impl HeadlessPresentation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Live visuals of a given kind
    pub fn count_kind(&self, pred: impl Fn(VisualKind) -> bool) -> usize {
        self.visuals.values().filter(|v| pred(v.kind)).count()
    }

    pub fn hud_text(&self, field: HudField) -> Option<&str> {
        self.hud.get(&field).map(String::as_str)
    }
}

impl Presentation for HeadlessPresentation {
    fn spawn_visual(
        &mut self,
        kind: VisualKind,
        transform: &Transform,
        _material: &Material,
    ) -> VisualHandle {
        self.next_handle += 1;
        let handle = VisualHandle(self.next_handle);
        self.visuals.insert(
            handle,
            HeadlessVisual {
                kind,
                position: transform.position,
            },
        );
        handle
    }

    fn update_visual_transform(&mut self, handle: VisualHandle, position: Vec3) {
        if let Some(visual) = self.visuals.get_mut(&handle) {
            visual.position = position;
        }
    }

    fn destroy_visual(&mut self, handle: VisualHandle) {
        self.visuals.remove(&handle);
    }

    fn play_timed_animation(
        &mut self,
        _handle: VisualHandle,
        _property: AnimatedProperty,
        _target: f32,
        _duration: f32,
        _easing: Easing,
    ) {
        self.animations_played += 1;
    }

    fn update_hud_text(&mut self, field: HudField, text: &str) {
        self.hud.insert(field, text.to_string());
    }

    fn on_game_over(&mut self) {
        self.game_over_count += 1;
        log::info!("Game Over");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spawn(entity: EntityId) -> Command {
        Command::Spawn {
            entity,
            kind: VisualKind::Obstacle(ObstacleKind::Barrier),
            transform: Transform {
                position: Vec3::new(0.0, 1.0, 20.0),
                scale: Vec3::ONE,
            },
            material: Material::opaque(Color::Red),
        }
    }

    #[test]
    fn test_easing_endpoints() {
        for easing in [Easing::Linear, Easing::OutQuad] {
            assert_eq!(easing.apply(0.0), 0.0);
            assert_eq!(easing.apply(1.0), 1.0);
            assert_eq!(easing.apply(2.0), 1.0);
        }
        // Out-quad front-loads the motion
        assert!(Easing::OutQuad.apply(0.5) > Easing::Linear.apply(0.5));
    }

    #[test]
    fn test_bridge_spawn_move_destroy() {
        let mut bridge = VisualBridge::new();
        let mut headless = HeadlessPresentation::new();

        bridge.apply(&[spawn(7)], &mut headless);
        assert_eq!(bridge.live_count(), 1);
        let handle = bridge.handle(7).unwrap();

        bridge.apply(
            &[Command::Move {
                entity: 7,
                position: Vec3::new(0.0, 1.0, 3.0),
            }],
            &mut headless,
        );
        assert_eq!(headless.visuals[&handle].position.z, 3.0);

        bridge.apply(&[Command::Destroy { entity: 7 }], &mut headless);
        assert_eq!(bridge.live_count(), 0);
        assert!(headless.visuals.is_empty());
    }

    #[test]
    fn test_bridge_ignores_unknown_entities() {
        let mut bridge = VisualBridge::new();
        let mut headless = HeadlessPresentation::new();
        bridge.apply(
            &[
                Command::Destroy { entity: 99 },
                Command::Move {
                    entity: 99,
                    position: Vec3::ZERO,
                },
            ],
            &mut headless,
        );
        assert_eq!(bridge.live_count(), 0);
        assert!(headless.visuals.is_empty());
    }

    #[test]
    fn test_bridge_hud_and_game_over() {
        let mut bridge = VisualBridge::new();
        let mut headless = HeadlessPresentation::new();
        bridge.apply(
            &[
                Command::Hud {
                    field: HudField::Lives,
                    text: HudField::Lives.format(2),
                },
                Command::GameOver,
            ],
            &mut headless,
        );
        assert_eq!(headless.hud_text(HudField::Lives), Some("Lives: 2"));
        assert_eq!(headless.game_over_count, 1);
    }
}
