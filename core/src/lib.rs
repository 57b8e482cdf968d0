#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Lane Defence battle engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems to react to deterministically. Systems consume event streams,
//! query immutable snapshots, and respond exclusively with new command
//! batches.

use std::time::Duration;

use serde::{Deserialize, Serialize};

mod archetype;
mod config;

pub use archetype::{
    CalamityEffect, CalamityKind, DefenderArchetype, DefenderStats, HostileArchetype, HostileStats,
    LOOTER_FALLBACK_DAMAGE,
};
pub use config::{BattleConfig, ConfigError, StatKey, StatUpgrade, WaveEntry};

/// Canonical banner emitted when the experience boots.
pub const BATTLE_BANNER: &str = "Welcome to Lane Defence.";

/// Number of grid columns a defender can be placed on.
pub const FIELD_COLUMNS: u32 = 9;

/// Number of horizontal lanes hostiles travel along.
pub const FIELD_LANES: u32 = 5;

/// Side length of a single square grid cell measured in world units.
pub const CELL_LENGTH: f32 = 80.0;

/// Total width of the battlefield: [`FIELD_COLUMNS`] times [`CELL_LENGTH`].
pub const FIELD_WIDTH: f32 = 720.0;

/// Horizontal distance at which a hostile is considered in melee contact
/// with a defender in its lane.
pub const CONTACT_RANGE: f32 = 24.0;

/// Distance at which a hunting hostile can seize its victim.
pub const GRAB_RANGE: f32 = 30.0;

/// Half-width of the collision window between a projectile and its target.
pub const PROJECTILE_HIT_RANGE: f32 = 20.0;

/// Margin beyond the field edges after which entities are culled or counted
/// as having left the battle.
pub const OFFSCREEN_MARGIN: f32 = 48.0;

/// Horizontal clearance a leaping hostile lands past the defender it vaults.
pub const LEAP_CLEARANCE: f32 = 56.0;

/// Peak vertical offset of the leap arc, exposed for rendering.
pub const LEAP_ARC_HEIGHT: f32 = 48.0;

/// Unique identifier assigned to a defender unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DefenderId(u32);

impl DefenderId {
    /// Creates a new defender identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a hostile unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HostileId(u32);

impl HostileId {
    /// Creates a new hostile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a new projectile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a collectible resource token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TokenId(u32);

impl TokenId {
    /// Creates a new token identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a support effect attachment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EffectId(u32);

impl EffectId {
    /// Creates a new effect identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// One of the fixed horizontal tracks hostiles travel along.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Lane(u32);

impl Lane {
    /// Creates a new lane index wrapper.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the underlying lane index.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Vertical centre of the lane expressed in world units.
    #[must_use]
    pub fn center_y(&self) -> f32 {
        (self.0 as f32 + 0.5) * CELL_LENGTH
    }

    /// Derives the lane containing the provided vertical coordinate,
    /// clamped to the configured lane count.
    #[must_use]
    pub fn containing(y: f32) -> Self {
        let index = (y / CELL_LENGTH).floor().max(0.0) as u32;
        Self(index.min(FIELD_LANES.saturating_sub(1)))
    }
}

/// Location of a single placement cell expressed as column and lane.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCell {
    column: u32,
    lane: Lane,
}

impl GridCell {
    /// Creates a new placement cell coordinate.
    #[must_use]
    pub const fn new(column: u32, lane: Lane) -> Self {
        Self { column, lane }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Lane that contains the cell.
    #[must_use]
    pub const fn lane(&self) -> Lane {
        self.lane
    }

    /// Centre of the cell in world units.
    #[must_use]
    pub fn center(&self) -> FieldPoint {
        FieldPoint::new(
            (self.column as f32 + 0.5) * CELL_LENGTH,
            self.lane.center_y(),
        )
    }

    /// Reports whether the cell lies within the configured field bounds.
    #[must_use]
    pub const fn in_bounds(&self) -> bool {
        self.column < FIELD_COLUMNS && self.lane.get() < FIELD_LANES
    }
}

/// Continuous position on the battlefield expressed in world units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldPoint {
    /// Horizontal coordinate; hostiles advance toward decreasing values.
    pub x: f32,
    /// Vertical coordinate; lanes partition this axis.
    pub y: f32,
}

impl FieldPoint {
    /// Creates a new field point from world-unit coordinates.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance between two field points.
    #[must_use]
    pub fn distance_to(&self, other: FieldPoint) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Reversible speed reduction carried by a projectile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SlowPayload {
    /// Factor the victim's speed is multiplied by while the slow is active.
    pub factor: f32,
    /// How long the slow lasts; reapplication refreshes without stacking.
    pub duration: Duration,
}

/// Behaviour phase a hostile currently occupies.
///
/// Each archetype uses the subset of phases its state machine defines; the
/// world integrates the per-tick consequences while the hostile behaviour
/// system drives the transitions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HostilePhase {
    /// Walking toward the defence line at effective speed.
    Advancing,
    /// Locked to a defender's edge, applying melee damage on a cadence.
    Striking {
        /// Defender currently being eaten.
        target: DefenderId,
    },
    /// Halted in lane, firing defender-seeking bolts.
    Volleying,
    /// Mid-air traversal over the first defender encountered.
    Leaping,
    /// Chasing a chosen victim with free two-axis movement.
    Hunting {
        /// Defender the hostile is closing in on.
        target: DefenderId,
    },
    /// Escaping off the right edge with a seized victim.
    Carrying,
    /// Escaping off the right edge empty-handed.
    Fleeing,
}

/// Faction a projectile seeks collisions against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProjectileSeeker {
    /// Fired by defenders, travelling right toward hostiles.
    Hostiles,
    /// Fired by ranged hostiles, travelling left toward defenders.
    Defenders,
}

/// Collision behaviour of a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProjectileKind {
    /// Destroyed on its first qualifying collision.
    Ballistic,
    /// Travels the full lane, damaging each hostile at most once.
    Piercing,
}

/// Target of a projectile collision resolved by the combat system.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StrikeTarget {
    /// The projectile struck a hostile.
    Hostile(HostileId),
    /// The projectile struck a defender.
    Defender(DefenderId),
}

/// Terminal result of a battle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// Every manifest entry spawned and no hostile remains alive.
    Victory,
    /// A hostile crossed the defence line with no sweeper left in its lane.
    Defeat,
}

/// Reasons a defender placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementError {
    /// The requested cell lies outside the configured grid bounds.
    OutOfBounds,
    /// The requested cell already holds a living defender.
    Occupied,
    /// The resource balance cannot cover the archetype's cost.
    InsufficientResources,
    /// The archetype was not part of the chosen roster.
    NotInRoster,
    /// Every producer slot granted by the level is already in use.
    ProducerSlotsFull,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests creation of a hostile at the right edge of a lane.
    SpawnHostile {
        /// Archetype of the hostile to create.
        archetype: HostileArchetype,
        /// Lane the hostile spawns into.
        lane: Lane,
    },
    /// Requests placement of a defender on the provided cell.
    PlaceDefender {
        /// Archetype of the defender to place.
        archetype: DefenderArchetype,
        /// Placement cell for the defender.
        cell: GridCell,
    },
    /// Collects a resource token, crediting its value to the balance.
    CollectToken {
        /// Identifier of the token to collect.
        token: TokenId,
    },
    /// Fires the defender's standard projectile down its lane.
    FireProjectile {
        /// Shooter requesting the shot.
        defender: DefenderId,
    },
    /// Fires a piercing wave that travels the full lane width.
    FirePiercingWave {
        /// Lancer requesting the wave.
        defender: DefenderId,
    },
    /// Detonates an area burst centred on the provided anchor point.
    DetonateBurst {
        /// Mortar requesting the burst.
        defender: DefenderId,
        /// Field point the burst is centred on.
        center: FieldPoint,
    },
    /// Emits a collectible resource token next to the producer.
    ProduceToken {
        /// Harvester requesting production.
        defender: DefenderId,
    },
    /// Transfers a fixed heal amount from the healer's pool to the ally.
    HealAlly {
        /// Mender performing the heal.
        healer: DefenderId,
        /// Damaged ally receiving the heal.
        ally: DefenderId,
    },
    /// Points a charger at the hostile it should rush toward.
    SetChargerObjective {
        /// Charger whose objective changes.
        defender: DefenderId,
        /// Hostile the charger moves toward.
        hostile: HostileId,
    },
    /// Detonates the charger, damaging every hostile around it.
    DetonateCharger {
        /// Charger that self-destructs.
        defender: DefenderId,
    },
    /// Fires a defender-seeking bolt from a volleying hostile.
    FireHostileBolt {
        /// Hostile requesting the bolt.
        hostile: HostileId,
    },
    /// Locks a hostile to a defender's edge and begins melee strikes.
    BeginStrike {
        /// Hostile entering the striking phase.
        hostile: HostileId,
        /// Defender being attacked.
        target: DefenderId,
    },
    /// Halts a ranged hostile so it can volley down its lane.
    HaltAndVolley {
        /// Hostile entering the volleying phase.
        hostile: HostileId,
    },
    /// Returns a halted hostile to its advancing phase.
    ResumeAdvance {
        /// Hostile resuming its advance.
        hostile: HostileId,
    },
    /// Starts a leap arc ending at the provided clearance coordinate.
    BeginLeap {
        /// Hostile vaulting the defender ahead of it.
        hostile: HostileId,
        /// Horizontal coordinate the leap lands on.
        clearance_x: f32,
    },
    /// Sends a hostile chasing the chosen victim.
    Hunt {
        /// Hostile entering the hunting phase.
        hostile: HostileId,
        /// Defender chosen as the victim.
        target: DefenderId,
    },
    /// Seizes the victim, removing it permanently, and begins the escape.
    GrabDefender {
        /// Hostile performing the grab.
        hostile: HostileId,
        /// Defender being carried off the field.
        victim: DefenderId,
    },
    /// Destroys the targeted producer immediately.
    StealProducer {
        /// Hostile performing the theft.
        hostile: HostileId,
        /// Producer being destroyed.
        victim: DefenderId,
    },
    /// Sends a hostile escaping off the right edge empty-handed.
    Flee {
        /// Hostile entering the fleeing phase.
        hostile: HostileId,
    },
    /// Permanently demotes a hostile to default melee behaviour.
    AdoptMeleeFallback {
        /// Hostile losing its speciality.
        hostile: HostileId,
    },
    /// Applies a resolved projectile collision.
    ProjectileHit {
        /// Projectile that collided.
        projectile: ProjectileId,
        /// Entity the projectile struck.
        target: StrikeTarget,
    },
    /// Replaces every defender's aura factor with the recomputed table.
    ApplyAuras {
        /// Recomputed multiplicative factor per living defender.
        factors: Vec<(DefenderId, f32)>,
    },
    /// Activates a calamity, perturbing every qualifying entity.
    ActivateCalamity {
        /// Calamity drawn from the level pool.
        kind: CalamityKind,
    },
    /// Expires the active calamity, reverting its effect exactly.
    ExpireCalamity,
    /// Removes the listed defenders as part of a one-shot calamity.
    CullDefenders {
        /// Defenders selected by the calamity director.
        defenders: Vec<DefenderId>,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that a hostile entered the field.
    HostileSpawned {
        /// Identifier assigned to the hostile.
        hostile: HostileId,
        /// Archetype of the spawned hostile.
        archetype: HostileArchetype,
        /// Lane the hostile spawned into.
        lane: Lane,
    },
    /// Reports that a hostile died and was credited to the kill counter.
    HostileSlain {
        /// Identifier of the slain hostile.
        hostile: HostileId,
    },
    /// Reports that a hostile left the field alive.
    HostileEscaped {
        /// Identifier of the escaped hostile.
        hostile: HostileId,
    },
    /// Confirms that a defender was placed.
    DefenderPlaced {
        /// Identifier assigned to the defender.
        defender: DefenderId,
        /// Archetype of the placed defender.
        archetype: DefenderArchetype,
        /// Cell the defender occupies.
        cell: GridCell,
    },
    /// Reports that a defender was destroyed.
    DefenderSlain {
        /// Identifier of the destroyed defender.
        defender: DefenderId,
    },
    /// Reports that a defender was abducted or stolen rather than killed.
    DefenderSeized {
        /// Identifier of the seized defender.
        defender: DefenderId,
    },
    /// Reports that a placement request was rejected.
    PlacementRejected {
        /// Archetype requested for placement.
        archetype: DefenderArchetype,
        /// Cell provided in the placement request.
        cell: GridCell,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Confirms that a producer emitted a resource token.
    TokenEmitted {
        /// Identifier assigned to the token.
        token: TokenId,
    },
    /// Confirms that a token was collected into the resource balance.
    TokenCollected {
        /// Identifier of the collected token.
        token: TokenId,
        /// Value credited to the balance.
        value: u32,
    },
    /// Reports that a lane sweeper activated and cleared its lane.
    SweeperTriggered {
        /// Lane the sweeper cleared.
        lane: Lane,
    },
    /// Announces that a calamity became active.
    CalamityStarted {
        /// Kind of calamity that activated.
        kind: CalamityKind,
    },
    /// Announces that the active calamity expired and was reverted.
    CalamityEnded {
        /// Kind of calamity that ended.
        kind: CalamityKind,
    },
    /// Announces the terminal result of the battle.
    BattleEnded {
        /// Result the battle concluded with.
        outcome: Outcome,
    },
}

/// Immutable representation of a single defender's state used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct DefenderSnapshot {
    /// Unique identifier assigned to the defender.
    pub id: DefenderId,
    /// Archetype of the defender.
    pub archetype: DefenderArchetype,
    /// Cell the defender was placed on.
    pub cell: GridCell,
    /// Current field position; only chargers move off their cell.
    pub position: FieldPoint,
    /// Remaining health.
    pub health: f32,
    /// Health the defender was placed with.
    pub max_health: f32,
    /// Effective per-use damage, including aura and calamity factors.
    pub damage: f32,
    /// Effective radius (aura, heal, or burst, depending on archetype).
    pub radius: f32,
    /// Buff value applied to allies within radius (aura sources only).
    pub buff_factor: f32,
    /// Multiplicative aura factor recomputed every tick.
    pub buff_multiplier: f32,
    /// Multiplicative calamity factor, `1.0` while no calamity targets it.
    pub calamity_factor: f32,
    /// Time remaining until the defender's cooldown-gated action is ready.
    pub ready_in: Duration,
    /// Remaining heal pool (healers only, zero otherwise).
    pub heal_pool: f32,
    /// Indicates whether a melee attacker is currently locked onto it.
    pub being_eaten: bool,
    /// Indicates whether a permanent upgrade touched this archetype.
    pub upgraded: bool,
}

/// Immutable representation of a single hostile's state used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct HostileSnapshot {
    /// Unique identifier assigned to the hostile.
    pub id: HostileId,
    /// Archetype of the hostile.
    pub archetype: HostileArchetype,
    /// Lane the hostile currently occupies.
    pub lane: Lane,
    /// Current field position.
    pub position: FieldPoint,
    /// Remaining health.
    pub health: f32,
    /// Health the hostile spawned with.
    pub max_health: f32,
    /// Effective per-strike damage, including calamity and fallback rules.
    pub damage: f32,
    /// Behaviour phase the hostile currently occupies.
    pub phase: HostilePhase,
    /// Time remaining until the hostile's attack cadence is ready.
    pub ready_in: Duration,
    /// Indicates whether a slow effect is currently active.
    pub slowed: bool,
    /// Indicates whether the hostile already spent its single leap.
    pub leapt: bool,
    /// Indicates whether the hostile was demoted to default melee.
    pub melee_fallback: bool,
}

/// Immutable representation of a single projectile used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct ProjectileSnapshot {
    /// Unique identifier assigned to the projectile.
    pub id: ProjectileId,
    /// Faction the projectile seeks collisions against.
    pub seeker: ProjectileSeeker,
    /// Collision behaviour of the projectile.
    pub kind: ProjectileKind,
    /// Lane the projectile travels along.
    pub lane: Lane,
    /// Horizontal coordinate of the projectile.
    pub x: f32,
    /// Signed horizontal velocity in world units per second.
    pub velocity: f32,
    /// Damage applied on collision.
    pub damage: f32,
    /// Optional slow payload applied to the first hostile struck.
    pub slow: Option<SlowPayload>,
    /// Hostiles a piercing projectile has already damaged.
    pub already_struck: Vec<HostileId>,
}

/// Immutable representation of a collectible resource token.
#[derive(Clone, Debug, PartialEq)]
pub struct TokenSnapshot {
    /// Unique identifier assigned to the token.
    pub id: TokenId,
    /// Field position the token rests at.
    pub position: FieldPoint,
    /// Value credited to the resource balance on collection.
    pub value: u32,
}

/// Entity a support effect is attached to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EffectParent {
    /// The effect follows a defender.
    Defender(DefenderId),
    /// The effect follows a hostile.
    Hostile(HostileId),
}

/// Visual/logical attachment bound to a parent entity's lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EffectKind {
    /// Ring drawn around an aura source.
    AuraRing,
    /// Marker drawn on entities perturbed by a persistent calamity.
    CalamityMark,
}

/// Immutable representation of a support effect used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SupportEffectSnapshot {
    /// Unique identifier assigned to the effect.
    pub id: EffectId,
    /// Kind of attachment.
    pub kind: EffectKind,
    /// Entity the effect is bound to.
    pub parent: EffectParent,
    /// Radius of the attachment, zero for point markers.
    pub radius: f32,
}

/// Transient on-screen record describing an activated calamity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CalamityNotice {
    /// Kind of calamity that activated.
    pub kind: CalamityKind,
    /// World clock value at activation.
    pub started_at: Duration,
    /// World clock value the notice should disappear at; independent of the
    /// effect's own duration.
    pub visible_until: Duration,
}

/// Aggregated battle counters exposed to the UI and meta layers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BattleProgress {
    /// Hostiles spawned so far.
    pub spawned: u32,
    /// Total hostiles in the level manifest.
    pub total: u32,
    /// Hostiles killed so far.
    pub killed: u32,
    /// Hostiles that left the field alive.
    pub escaped: u32,
    /// Defenders removed by abduction or theft rather than combat.
    pub neutralized: u32,
    /// Current resource balance.
    pub resources: u32,
    /// Current world clock.
    pub clock: Duration,
    /// Terminal result, if the battle has concluded.
    pub outcome: Option<Outcome>,
}

impl BattleProgress {
    /// Fraction of the manifest that has spawned.
    #[must_use]
    pub fn spawn_progress(&self) -> f32 {
        if self.total == 0 {
            return 0.0;
        }
        self.spawned as f32 / self.total as f32
    }

    /// Fraction of the manifest that has been killed.
    #[must_use]
    pub fn kill_progress(&self) -> f32 {
        if self.total == 0 {
            return 0.0;
        }
        self.killed as f32 / self.total as f32
    }
}

/// Read-only snapshot describing all living defenders.
#[derive(Clone, Debug, Default)]
pub struct DefenderView {
    snapshots: Vec<DefenderSnapshot>,
}

impl DefenderView {
    /// Creates a new defender view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<DefenderSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &DefenderSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up a snapshot by identifier.
    #[must_use]
    pub fn get(&self, id: DefenderId) -> Option<&DefenderSnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<DefenderSnapshot> {
        self.snapshots
    }
}

/// Read-only snapshot describing all living hostiles.
#[derive(Clone, Debug, Default)]
pub struct HostileView {
    snapshots: Vec<HostileSnapshot>,
}

impl HostileView {
    /// Creates a new hostile view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<HostileSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &HostileSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up a snapshot by identifier.
    #[must_use]
    pub fn get(&self, id: HostileId) -> Option<&HostileSnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<HostileSnapshot> {
        self.snapshots
    }
}

/// Read-only snapshot describing all live projectiles.
#[derive(Clone, Debug, Default)]
pub struct ProjectileView {
    snapshots: Vec<ProjectileSnapshot>,
}

impl ProjectileView {
    /// Creates a new projectile view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<ProjectileSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &ProjectileSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<ProjectileSnapshot> {
        self.snapshots
    }
}

/// Read-only snapshot describing all uncollected resource tokens.
#[derive(Clone, Debug, Default)]
pub struct TokenView {
    snapshots: Vec<TokenSnapshot>,
}

impl TokenView {
    /// Creates a new token view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TokenSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &TokenSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TokenSnapshot> {
        self.snapshots
    }
}
