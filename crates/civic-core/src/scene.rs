//! Scene planning: turning a choice into city elements.
//!
//! The planner reads keywords in the chosen option's text and adds themed
//! elements (parks, factories, transit, ...) at positions inside a zone
//! chosen by element type. It also places the decorative rewards of newly
//! unlocked achievements. All randomness comes from the caller's RNG and
//! ids come from a per-session sequence, so a seeded session produces the
//! same city every time.
//!
//! Scene output is decorative; nothing here can fail a turn.

use std::f64::consts::{FRAC_PI_4, TAU};

use civic_types::{
    GameState, SceneAction, SceneChange, SceneElement, SceneElementType, UnlockedAchievement, Vec3,
};
use rand::Rng;

/// Radius of the buildable city disc.
pub const CITY_RADIUS: f64 = 60.0;

/// Placement tries before accepting an overlapping position.
const PLACEMENT_ATTEMPTS: u32 = 10;

/// Height used for effects stacked on the last placed building.
const STACK_HEIGHT: f64 = 4.0;

/// Id of the element every city starts with.
pub const CITY_HALL_ID: &str = "city_hall";

/// Annulus sector in which elements of one type are placed.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Zone {
    min_radius: f64,
    max_radius: f64,
    sector_start: f64,
    sector_end: f64,
}

impl Zone {
    const fn ring(min: f64, max: f64) -> Self {
        Self::sector(min, max, 0.0, TAU)
    }

    const fn sector(min: f64, max: f64, start: f64, end: f64) -> Self {
        Self {
            min_radius: CITY_RADIUS * min,
            max_radius: CITY_RADIUS * max,
            sector_start: start,
            sector_end: end,
        }
    }

    fn for_type(kind: SceneElementType) -> Self {
        match kind {
            SceneElementType::Vegetation => Self::ring(0.6, 0.9),
            SceneElementType::Industrial => Self::sector(0.4, 0.7, FRAC_PI_4, 3.0 * FRAC_PI_4),
            SceneElementType::Residential => {
                Self::sector(0.3, 0.8, 5.0 * FRAC_PI_4, 7.0 * FRAC_PI_4)
            }
            SceneElementType::Commercial => {
                Self::sector(0.2, 0.5, 3.0 * FRAC_PI_4, 5.0 * FRAC_PI_4)
            }
            SceneElementType::Civic => Self::ring(0.1, 0.3),
            SceneElementType::Infrastructure => Self::ring(0.2, 0.9),
            SceneElementType::Building => Self::ring(0.2, 0.7),
            SceneElementType::Effect => Self::ring(0.0, 1.0),
        }
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec3 {
        let angle = rng.random_range(self.sector_start..self.sector_end);
        let radius = if self.max_radius > self.min_radius {
            rng.random_range(self.min_radius..self.max_radius)
        } else {
            self.min_radius
        };
        Vec3::new(angle.cos() * radius, 0.0, angle.sin() * radius)
    }
}

/// Minimum spacing between a new element of `placing` and an existing one.
fn spacing(placing: SceneElementType, existing: SceneElementType) -> f64 {
    match (placing, existing) {
        (SceneElementType::Vegetation, SceneElementType::Vegetation) => 3.0,
        (SceneElementType::Industrial, _) => 8.0,
        _ => 5.0,
    }
}

/// Per-session scene planner.
#[derive(Debug, Clone, Default)]
pub struct ScenePlanner {
    last_position: Vec3,
    sequence: u64,
}

impl ScenePlanner {
    /// A planner with an empty id sequence.
    pub const fn new() -> Self {
        Self {
            last_position: Vec3::new(0.0, 0.0, 0.0),
            sequence: 0,
        }
    }

    /// Forget placement history and restart the id sequence.
    pub const fn reset(&mut self) {
        self.last_position = Vec3::new(0.0, 0.0, 0.0);
        self.sequence = 0;
    }

    /// The scene of a brand-new city: the city hall at the origin.
    pub fn initial_elements() -> Vec<SceneElement> {
        vec![SceneElement {
            id: String::from(CITY_HALL_ID),
            element_type: SceneElementType::Building,
            model_path: String::from("/models/buildings/city-hall.glb"),
            position: Vec3::default(),
            scale: None,
            rotation: None,
        }]
    }

    /// Plan the scene changes for a turn: themed elements for the chosen
    /// option followed by reward elements for `unlocked`.
    ///
    /// `state` is the post-turn state; its stats gate the optional
    /// decorations and its scene is used for overlap checks.
    pub fn plan_turn<R: Rng + ?Sized>(
        &mut self,
        choice_text: &str,
        state: &GameState,
        unlocked: &[UnlockedAchievement],
        rng: &mut R,
    ) -> Vec<SceneChange> {
        let mut plan = Plan {
            planner: self,
            existing: &state.scene_elements,
            changes: Vec::new(),
            rng,
        };
        plan.themes(&choice_text.to_lowercase(), state);
        plan.rewards(unlocked);
        tracing::debug!(changes = plan.changes.len(), "scene planned");
        plan.changes
    }

    /// Plan only the reward elements for `unlocked`.
    pub fn plan_rewards<R: Rng + ?Sized>(
        &mut self,
        existing: &[SceneElement],
        unlocked: &[UnlockedAchievement],
        rng: &mut R,
    ) -> Vec<SceneChange> {
        let mut plan = Plan {
            planner: self,
            existing,
            changes: Vec::new(),
            rng,
        };
        plan.rewards(unlocked);
        plan.changes
    }

    fn next_id(&mut self, prefix: &str) -> String {
        self.sequence = self.sequence.saturating_add(1);
        format!("{prefix}_{}", self.sequence)
    }
}

/// Apply scene changes in order: append, remove by id, replace by id.
pub fn apply_changes(scene: &mut Vec<SceneElement>, changes: &[SceneChange]) {
    for change in changes {
        match change.action {
            SceneAction::Add => scene.push(change.element.clone()),
            SceneAction::Remove => scene.retain(|el| el.id != change.element.id),
            SceneAction::Modify => {
                if let Some(slot) = scene.iter_mut().find(|el| el.id == change.element.id) {
                    slot.clone_from(&change.element);
                }
            }
        }
    }
}

/// Working state of one planning pass.
struct Plan<'a, R: Rng + ?Sized> {
    planner: &'a mut ScenePlanner,
    existing: &'a [SceneElement],
    changes: Vec<SceneChange>,
    rng: &'a mut R,
}

impl<R: Rng + ?Sized> Plan<'_, R> {
    fn pick<'s>(&mut self, options: &[&'s str]) -> &'s str {
        if options.is_empty() {
            return "";
        }
        let idx = self.rng.random_range(0..options.len());
        options.get(idx).copied().unwrap_or_default()
    }

    fn overlaps(&self, kind: SceneElementType, at: Vec3) -> bool {
        let pending = self.changes.iter().map(|c| &c.element);
        self.existing.iter().chain(pending).any(|el| {
            let distance = (el.position.x - at.x).hypot(el.position.z - at.z);
            distance < spacing(kind, el.element_type)
        })
    }

    /// Find a free spot in the zone for `kind`, or settle for a fresh
    /// random one after the attempts run out.
    fn place(&mut self, kind: SceneElementType) -> Vec3 {
        let zone = Zone::for_type(kind);
        let mut position = None;
        for _ in 0..PLACEMENT_ATTEMPTS {
            let candidate = zone.sample(&mut *self.rng);
            if !self.overlaps(kind, candidate) {
                position = Some(candidate);
                break;
            }
        }
        let position = position.unwrap_or_else(|| zone.sample(&mut *self.rng));
        self.planner.last_position = position;
        position
    }

    /// The last placed position, raised for stacking effects.
    const fn above_last(&self) -> Vec3 {
        Vec3::new(
            self.planner.last_position.x,
            STACK_HEIGHT,
            self.planner.last_position.z,
        )
    }

    /// Ground position offset from the last placed element.
    fn beside_last(&self, dx: f64, dz: f64) -> Vec3 {
        Vec3::new(
            self.planner.last_position.x + dx,
            0.0,
            self.planner.last_position.z + dz,
        )
    }

    fn add(
        &mut self,
        kind: SceneElementType,
        prefix: &str,
        model_path: String,
        position: Vec3,
        scale: Vec3,
    ) {
        let id = self.planner.next_id(prefix);
        self.changes.push(SceneChange {
            action: SceneAction::Add,
            element: SceneElement {
                id,
                element_type: kind,
                model_path,
                position,
                scale: Some(scale),
                rotation: None,
            },
        });
    }

    /// Add an element at a freshly placed position in its zone.
    fn add_placed(
        &mut self,
        kind: SceneElementType,
        zone: SceneElementType,
        prefix: &str,
        model_path: String,
        scale: Vec3,
    ) {
        let position = self.place(zone);
        self.add(kind, prefix, model_path, position, scale);
    }

    #[allow(clippy::too_many_lines)]
    fn themes(&mut self, text: &str, state: &GameState) {
        use SceneElementType::{
            Building, Commercial, Effect, Industrial, Infrastructure, Residential, Vegetation,
        };

        let has = |words: &[&str]| words.iter().any(|w| text.contains(w));
        let stats = state.stats;

        if has(&["park", "green", "garden"]) {
            let park = self.pick(&["community_park", "botanical_garden", "playground", "dog_park"]);
            self.add_placed(
                Vegetation,
                Vegetation,
                &format!("park_{park}"),
                format!("/models/vegetation/{park}.glb"),
                Vec3::splat(1.5),
            );
            for _ in 0..3 {
                self.add_placed(
                    Vegetation,
                    Vegetation,
                    "tree",
                    String::from("/models/vegetation/tree.glb"),
                    Vec3::new(0.8, 1.2, 0.8),
                );
            }
            if stats.environment > 70 {
                self.add_placed(
                    Infrastructure,
                    Infrastructure,
                    "fountain",
                    String::from("/models/infrastructure/fountain.glb"),
                    Vec3::splat(1.0),
                );
                if stats.happiness > 70 {
                    let at = self.above_last();
                    self.add(
                        Effect,
                        "sparkle",
                        String::from("/models/effects/sparkle.glb"),
                        at,
                        Vec3::splat(1.0),
                    );
                }
            }
        }

        if has(&["factory", "industrial", "manufacturing"]) {
            let factory = self.pick(&[
                "manufacturing_plant",
                "chemical_factory",
                "steel_mill",
                "textile_factory",
            ]);
            self.add_placed(
                Building,
                Industrial,
                &format!("factory_{factory}"),
                format!("/models/buildings/{factory}.glb"),
                Vec3::new(2.0, 1.5, 2.0),
            );
            if stats.environment < 70 {
                let at = self.above_last();
                self.add(
                    Effect,
                    "smoke",
                    String::from("/models/effects/smoke_effect.glb"),
                    at,
                    Vec3::new(1.0, 2.0, 1.0),
                );
                if stats.environment < 40 {
                    let at = self.beside_last(5.0, 0.0);
                    self.add(
                        Effect,
                        "heavy_smoke",
                        String::from("/models/effects/heavy_smoke.glb"),
                        at,
                        Vec3::new(1.5, 2.5, 1.5),
                    );
                }
            }
            let at = self.beside_last(10.0, 0.0);
            self.add(
                Building,
                "storage",
                String::from("/models/buildings/warehouse.glb"),
                at,
                Vec3::new(1.2, 1.0, 1.2),
            );
        }

        if has(&["transport", "bus", "train", "subway"]) {
            self.add_placed(
                Infrastructure,
                Infrastructure,
                "transport_hub",
                String::from("/models/infrastructure/transport_hub.glb"),
                Vec3::new(1.5, 1.0, 2.0),
            );
            let stop = if text.contains("bus") {
                "bus_stop"
            } else {
                "train_station"
            };
            for _ in 0..3 {
                self.add_placed(
                    Infrastructure,
                    Infrastructure,
                    stop,
                    format!("/models/infrastructure/{stop}.glb"),
                    Vec3::new(0.8, 1.0, 0.8),
                );
            }
            if stats.economy > 60 {
                self.add_placed(
                    Infrastructure,
                    Infrastructure,
                    "road_improvement",
                    String::from("/models/infrastructure/improved_road.glb"),
                    Vec3::new(3.0, 0.2, 3.0),
                );
            }
        }

        if has(&["recycle", "waste", "garbage"]) {
            self.add_placed(
                Infrastructure,
                Infrastructure,
                "recycling_center",
                String::from("/models/infrastructure/recycling_center.glb"),
                Vec3::new(1.2, 1.0, 1.2),
            );
            for _ in 0..4 {
                self.add_placed(
                    Infrastructure,
                    Infrastructure,
                    "recycle_bin",
                    String::from("/models/infrastructure/recycle_bin.glb"),
                    Vec3::splat(0.5),
                );
            }
            if stats.environment > 60 {
                self.add_placed(
                    Effect,
                    Effect,
                    "clean_effect",
                    String::from("/models/effects/clean_air.glb"),
                    Vec3::splat(2.0),
                );
            }
        }

        if has(&["solar", "renewable", "wind", "energy"]) {
            let source = if text.contains("wind") {
                "wind_turbine"
            } else if text.contains("solar") {
                "solar_panels"
            } else {
                self.pick(&["solar_farm", "wind_turbine", "solar_panels"])
            };
            let scale = if source == "wind_turbine" {
                Vec3::new(1.0, 3.0, 1.0)
            } else {
                Vec3::new(2.0, 0.2, 2.0)
            };
            self.add_placed(
                Infrastructure,
                Infrastructure,
                &format!("renewable_{source}"),
                format!("/models/infrastructure/{source}.glb"),
                scale,
            );
            if source == "wind_turbine" {
                for (dx, dz) in [(0.0, 0.0), (10.0, 5.0)] {
                    let at = self.beside_last(dx, dz);
                    self.add(
                        Infrastructure,
                        "wind_turbine",
                        String::from("/models/infrastructure/wind_turbine.glb"),
                        at,
                        Vec3::new(1.0, 3.0, 1.0),
                    );
                }
            }
            let at = self.above_last();
            self.add(
                Effect,
                "energy_glow",
                String::from("/models/effects/energy_glow.glb"),
                at,
                Vec3::splat(1.0),
            );
        }

        if has(&["housing", "residential", "apartment"]) {
            let housing = if has(&["apartment", "high"]) {
                "high_rise"
            } else {
                self.pick(&[
                    "apartment_complex",
                    "suburban_homes",
                    "townhouses",
                    "high_rise",
                ])
            };
            let scale = if housing == "high_rise" {
                Vec3::new(1.0, 4.0, 1.0)
            } else {
                Vec3::new(1.5, 1.0, 1.5)
            };
            self.add_placed(
                Building,
                Residential,
                &format!("housing_{housing}"),
                format!("/models/buildings/{housing}.glb"),
                scale,
            );
            if stats.happiness > 60 {
                let at = self.beside_last(8.0, 0.0);
                self.add(
                    Building,
                    "community_center",
                    String::from("/models/buildings/community_center.glb"),
                    at,
                    Vec3::new(1.2, 1.0, 1.2),
                );
                let at = self.beside_last(0.0, 8.0);
                self.add(
                    Vegetation,
                    "residential_park",
                    String::from("/models/vegetation/small_park.glb"),
                    at,
                    Vec3::splat(1.0),
                );
            }
        }

        if has(&["school", "education", "university"]) {
            let (school, scale) = if text.contains("university") {
                ("university", Vec3::new(2.5, 1.5, 2.5))
            } else {
                ("school", Vec3::new(1.8, 1.0, 1.8))
            };
            self.add_placed(
                Building,
                Building,
                school,
                format!("/models/buildings/{school}.glb"),
                scale,
            );
            let at = self.beside_last(10.0, 0.0);
            self.add(
                Infrastructure,
                "sports_field",
                String::from("/models/infrastructure/sports_field.glb"),
                at,
                Vec3::new(1.5, 0.1, 1.5),
            );
            if stats.happiness > 50 {
                let at = self.above_last();
                self.add(
                    Effect,
                    "knowledge_effect",
                    String::from("/models/effects/knowledge.glb"),
                    at,
                    Vec3::splat(1.0),
                );
            }
        }

        if has(&["hospital", "healthcare", "clinic"]) {
            let (facility, scale) = if text.contains("hospital") {
                ("hospital", Vec3::splat(2.0))
            } else {
                ("clinic", Vec3::new(1.2, 1.0, 1.2))
            };
            self.add_placed(
                Building,
                Building,
                facility,
                format!("/models/buildings/{facility}.glb"),
                scale,
            );
            let at = self.beside_last(7.0, 0.0);
            self.add(
                Infrastructure,
                "parking",
                String::from("/models/infrastructure/parking_lot.glb"),
                at,
                Vec3::new(1.5, 0.1, 1.5),
            );
            if stats.happiness > 60 {
                let at = self.above_last();
                self.add(
                    Effect,
                    "health_effect",
                    String::from("/models/effects/health.glb"),
                    at,
                    Vec3::splat(1.0),
                );
            }
        }

        // Periodic commercial growth.
        if state.turn % 3 == 0 && stats.economy > 50 {
            let shop = self.pick(&["office_building", "retail_store", "restaurant", "cafe"]);
            let height = self.rng.random_range(1.0..3.0);
            self.add_placed(
                Building,
                Commercial,
                &format!("commercial_{shop}"),
                format!("/models/buildings/{shop}.glb"),
                Vec3::new(1.0, height, 1.0),
            );
        }
    }

    fn rewards(&mut self, unlocked: &[UnlockedAchievement]) {
        for achievement in unlocked {
            let Some(reward) = &achievement.reward else {
                continue;
            };
            if let Some(effect) = &reward.visual_effect {
                self.add_placed(
                    SceneElementType::Effect,
                    SceneElementType::Effect,
                    &format!("achievement_effect_{}", achievement.id),
                    format!("/models/effects/{effect}.glb"),
                    Vec3::splat(1.5),
                );
            }
            if let Some(building) = &reward.city_element {
                self.add_placed(
                    SceneElementType::Building,
                    SceneElementType::Building,
                    &format!("achievement_building_{}", achievement.id),
                    format!("/models/buildings/{building}.glb"),
                    Vec3::splat(1.2),
                );
            }
        }
    }
}
