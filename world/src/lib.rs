#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative battle state management for Lane Defence.
//!
//! The world owns every entity collection and is the only place state
//! mutates. Adapters and systems submit [`Command`] values through [`apply`];
//! the world validates them against current liveness and cooldown state,
//! executes the survivors, and broadcasts [`Event`] values. Stale commands
//! referring to dead entities are silent no-ops, never errors.

use std::time::Duration;

use lane_defence_core::{
    BattleConfig, CalamityEffect, CalamityKind, CalamityNotice, Command, ConfigError,
    DefenderArchetype, DefenderId, EffectId, EffectKind, EffectParent, Event, FieldPoint,
    GridCell, HostileArchetype, HostileId, HostilePhase, Lane, Outcome, PlacementError,
    ProjectileId, ProjectileKind, ProjectileSeeker, StrikeTarget, TokenId, CONTACT_RANGE,
    FIELD_LANES, FIELD_WIDTH, GRAB_RANGE, LEAP_ARC_HEIGHT, OFFSCREEN_MARGIN,
};

mod entities;

use entities::{
    ArchetypeTable, Defender, Hostile, Leap, Projectile, SlowEffect, SupportEffect, Token,
};

const LEAP_DURATION: Duration = Duration::from_millis(1200);
const NOTICE_DURATION: Duration = Duration::from_secs(5);
const HOSTILE_BOLT_SPEED: f32 = 240.0;
const MUZZLE_OFFSET: f32 = 12.0;
const TOKEN_DROP_OFFSET: f32 = 24.0;

/// Represents the authoritative Lane Defence battle state.
#[derive(Debug)]
pub struct World {
    clock: Duration,
    table: ArchetypeTable,
    defenders: Vec<Defender>,
    hostiles: Vec<Hostile>,
    projectiles: Vec<Projectile>,
    tokens: Vec<Token>,
    effects: Vec<SupportEffect>,
    sweepers: Vec<bool>,
    roster: Vec<DefenderArchetype>,
    producer_slots: u32,
    resources: u32,
    next_defender: u32,
    next_hostile: u32,
    next_projectile: u32,
    next_token: u32,
    next_effect: u32,
    spawned: u32,
    total: u32,
    killed: u32,
    escaped: u32,
    neutralized: u32,
    outcome: Option<Outcome>,
    active_calamity: Option<CalamityKind>,
    notice: Option<CalamityNotice>,
}

impl World {
    /// Creates a new battle from the provided configuration.
    ///
    /// Malformed configuration is fatal: the level cannot start.
    pub fn new(config: BattleConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let table = ArchetypeTable::resolve(&config.upgrades)?;

        let mut sweepers = vec![false; FIELD_LANES as usize];
        for lane in &config.sweepers {
            sweepers[lane.get() as usize] = true;
        }

        Ok(Self {
            clock: Duration::ZERO,
            table,
            defenders: Vec::new(),
            hostiles: Vec::new(),
            projectiles: Vec::new(),
            tokens: Vec::new(),
            effects: Vec::new(),
            sweepers,
            roster: config.roster,
            producer_slots: config.producer_slots,
            resources: config.starting_resources,
            next_defender: 0,
            next_hostile: 0,
            next_projectile: 0,
            next_token: 0,
            next_effect: 0,
            spawned: 0,
            total: config.manifest.len() as u32,
            killed: 0,
            escaped: 0,
            neutralized: 0,
            outcome: None,
            active_calamity: None,
            notice: None,
        })
    }

    fn defender_index(&self, id: DefenderId) -> Option<usize> {
        self.defenders
            .iter()
            .position(|defender| defender.alive && defender.id == id)
    }

    fn hostile_index(&self, id: HostileId) -> Option<usize> {
        self.hostiles
            .iter()
            .position(|hostile| hostile.alive && hostile.id == id)
    }

    fn allocate_effect(&mut self, kind: EffectKind, parent: EffectParent, radius: f32) {
        let id = EffectId::new(self.next_effect);
        self.next_effect += 1;
        self.effects.push(SupportEffect {
            id,
            kind,
            parent,
            radius,
            alive: true,
        });
    }

    fn tick(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        self.clock += dt;
        out_events.push(Event::TimeAdvanced { dt });

        let clock = self.clock;
        for hostile in self.hostiles.iter_mut() {
            if let Some(slow) = hostile.slow {
                if slow.until <= clock {
                    hostile.slow = None;
                    hostile.speed = hostile.original_speed;
                }
            }
        }
        if let Some(notice) = self.notice {
            if notice.visible_until <= clock {
                self.notice = None;
            }
        }

        self.integrate_hostiles(dt);
        self.integrate_chargers(dt);
        self.integrate_projectiles(dt);
        self.resolve_boundaries(out_events);

        self.sweep_defender_deaths(out_events);
        self.sweep_hostile_deaths(out_events);
        self.cull_orphan_effects();
        self.compact();
    }

    fn integrate_hostiles(&mut self, dt: Duration) {
        let dt_secs = dt.as_secs_f32();
        let clock = self.clock;
        let (hostiles, defenders) = (&mut self.hostiles, &mut self.defenders);

        for hostile in hostiles.iter_mut() {
            if !hostile.alive {
                continue;
            }
            match hostile.phase {
                HostilePhase::Advancing => {
                    let step = hostile.effective_speed() * dt_secs;
                    let mut next_x = hostile.position.x - step;
                    let mut edge: Option<f32> = None;
                    for defender in defenders.iter() {
                        if defender.alive
                            && defender.cell.lane() == hostile.lane
                            && defender.position.x < hostile.position.x
                        {
                            let candidate = defender.position.x + CONTACT_RANGE;
                            if edge.map_or(true, |current| candidate > current) {
                                edge = Some(candidate);
                            }
                        }
                    }
                    if let Some(edge) = edge {
                        if next_x < edge && hostile.position.x >= edge {
                            next_x = edge;
                        }
                    }
                    hostile.position.x = next_x;
                }
                HostilePhase::Striking { target } => {
                    let victim = defenders
                        .iter_mut()
                        .find(|defender| defender.alive && defender.id == target);
                    match victim {
                        Some(defender) => {
                            if clock >= hostile.ready_at {
                                let stats = ArchetypeTable::hostile(hostile.archetype);
                                defender.health -= hostile.effective_damage(stats.damage);
                                hostile.ready_at = clock + stats.cooldown;
                            }
                        }
                        None => hostile.phase = HostilePhase::Advancing,
                    }
                }
                HostilePhase::Volleying => {}
                HostilePhase::Leaping => match hostile.leap {
                    Some(mut leap) => {
                        leap.elapsed = leap.elapsed.saturating_add(dt);
                        let t =
                            (leap.elapsed.as_secs_f32() / LEAP_DURATION.as_secs_f32()).min(1.0);
                        hostile.position.x = leap.start_x + (leap.end_x - leap.start_x) * t;
                        hostile.position.y = hostile.lane.center_y()
                            - (std::f32::consts::PI * t).sin() * LEAP_ARC_HEIGHT;
                        if t >= 1.0 {
                            hostile.leap = None;
                            hostile.leapt = true;
                            hostile.speed *= 0.5;
                            hostile.original_speed *= 0.5;
                            hostile.position.y = hostile.lane.center_y();
                            hostile.phase = HostilePhase::Advancing;
                        } else {
                            hostile.leap = Some(leap);
                        }
                    }
                    None => hostile.phase = HostilePhase::Advancing,
                },
                HostilePhase::Hunting { target } => {
                    let victim = defenders
                        .iter()
                        .find(|defender| defender.alive && defender.id == target);
                    match victim {
                        Some(defender) => {
                            let to = defender.position;
                            let distance = hostile.position.distance_to(to);
                            if distance > f32::EPSILON {
                                let step = (hostile.effective_speed() * dt_secs).min(distance);
                                hostile.position.x += (to.x - hostile.position.x) / distance * step;
                                hostile.position.y += (to.y - hostile.position.y) / distance * step;
                                hostile.lane = Lane::containing(hostile.position.y);
                            }
                        }
                        None => hostile.phase = HostilePhase::Advancing,
                    }
                }
                HostilePhase::Carrying | HostilePhase::Fleeing => {
                    let stats = ArchetypeTable::hostile(hostile.archetype);
                    hostile.position.x += stats.escape_speed * dt_secs;
                }
            }
        }
    }

    fn integrate_chargers(&mut self, dt: Duration) {
        let dt_secs = dt.as_secs_f32();
        let (defenders, hostiles, table) = (&mut self.defenders, &self.hostiles, &self.table);

        for defender in defenders.iter_mut() {
            if !defender.alive
                || defender.archetype != DefenderArchetype::Charger
                || defender.eaten_by.is_some()
            {
                continue;
            }
            let Some(objective) = defender.objective else {
                continue;
            };
            let Some(hostile) = hostiles
                .iter()
                .find(|hostile| hostile.alive && hostile.id == objective)
            else {
                defender.objective = None;
                continue;
            };
            let to = hostile.position;
            let distance = defender.position.distance_to(to);
            if distance > f32::EPSILON {
                let speed = table.defender(DefenderArchetype::Charger).move_speed;
                let step = (speed * dt_secs).min(distance);
                defender.position.x += (to.x - defender.position.x) / distance * step;
                defender.position.y += (to.y - defender.position.y) / distance * step;
            }
        }
    }

    fn integrate_projectiles(&mut self, dt: Duration) {
        let dt_secs = dt.as_secs_f32();
        for projectile in self.projectiles.iter_mut() {
            if !projectile.alive {
                continue;
            }
            projectile.x += projectile.velocity * dt_secs;
            if projectile.x < -OFFSCREEN_MARGIN || projectile.x > FIELD_WIDTH + OFFSCREEN_MARGIN {
                projectile.alive = false;
            }
        }
    }

    fn resolve_boundaries(&mut self, out_events: &mut Vec<Event>) {
        let mut swept_lanes: Vec<Lane> = Vec::new();

        for index in 0..self.hostiles.len() {
            let (alive, x, lane, phase, id) = {
                let hostile = &self.hostiles[index];
                (
                    hostile.alive,
                    hostile.position.x,
                    hostile.lane,
                    hostile.phase,
                    hostile.id,
                )
            };
            if !alive {
                continue;
            }

            let escaping = matches!(phase, HostilePhase::Carrying | HostilePhase::Fleeing);
            if escaping {
                if x >= FIELD_WIDTH + OFFSCREEN_MARGIN {
                    self.hostiles[index].alive = false;
                    self.escaped += 1;
                    out_events.push(Event::HostileEscaped { hostile: id });
                }
                continue;
            }

            if x <= 0.0 {
                let lane_index = lane.get() as usize;
                if self.sweepers.get(lane_index).copied().unwrap_or(false) {
                    self.sweepers[lane_index] = false;
                    swept_lanes.push(lane);
                    out_events.push(Event::SweeperTriggered { lane });
                } else {
                    self.hostiles[index].alive = false;
                    self.escaped += 1;
                    out_events.push(Event::HostileEscaped { hostile: id });
                    if self.outcome.is_none() {
                        self.outcome = Some(Outcome::Defeat);
                        out_events.push(Event::BattleEnded {
                            outcome: Outcome::Defeat,
                        });
                    }
                }
            }
        }

        for lane in swept_lanes {
            for hostile in self.hostiles.iter_mut() {
                if hostile.alive && hostile.lane == lane {
                    hostile.health = 0.0;
                }
            }
        }
    }

    fn sweep_defender_deaths(&mut self, out_events: &mut Vec<Event>) {
        let mut fallen: Vec<DefenderId> = Vec::new();
        for defender in self.defenders.iter_mut() {
            if defender.alive && defender.health <= 0.0 {
                defender.alive = false;
                defender.eaten_by = None;
                fallen.push(defender.id);
            }
        }
        for id in fallen {
            out_events.push(Event::DefenderSlain { defender: id });
            self.release_attackers(id);
        }
    }

    /// Every hostile death is credited to the kill counter here and nowhere
    /// else, so `killed == spawned − alive − escaped` holds regardless of
    /// the death's source.
    fn sweep_hostile_deaths(&mut self, out_events: &mut Vec<Event>) {
        let mut slain: Vec<(HostileId, Option<DefenderId>)> = Vec::new();
        for hostile in self.hostiles.iter_mut() {
            if hostile.alive && hostile.health <= 0.0 {
                hostile.alive = false;
                let victim = match hostile.phase {
                    HostilePhase::Striking { target } => Some(target),
                    _ => None,
                };
                slain.push((hostile.id, victim));
            }
        }
        for (id, victim) in slain {
            self.killed += 1;
            out_events.push(Event::HostileSlain { hostile: id });
            if let Some(victim) = victim {
                if let Some(defender) = self
                    .defenders
                    .iter_mut()
                    .find(|defender| defender.id == victim)
                {
                    if defender.eaten_by == Some(id) {
                        defender.eaten_by = None;
                    }
                }
            }
        }
    }

    fn release_attackers(&mut self, victim: DefenderId) {
        for hostile in self.hostiles.iter_mut() {
            match hostile.phase {
                HostilePhase::Striking { target } | HostilePhase::Hunting { target }
                    if target == victim =>
                {
                    hostile.phase = HostilePhase::Advancing;
                }
                _ => {}
            }
        }
    }

    fn cull_orphan_effects(&mut self) {
        let (effects, defenders, hostiles) = (&mut self.effects, &self.defenders, &self.hostiles);
        for effect in effects.iter_mut() {
            if !effect.alive {
                continue;
            }
            let parent_alive = match effect.parent {
                EffectParent::Defender(id) => defenders
                    .iter()
                    .any(|defender| defender.alive && defender.id == id),
                EffectParent::Hostile(id) => hostiles
                    .iter()
                    .any(|hostile| hostile.alive && hostile.id == id),
            };
            if !parent_alive {
                effect.alive = false;
            }
        }
    }

    fn compact(&mut self) {
        self.defenders.retain(|defender| defender.alive);
        self.hostiles.retain(|hostile| hostile.alive);
        self.projectiles.retain(|projectile| projectile.alive);
        self.tokens.retain(|token| token.alive);
        self.effects.retain(|effect| effect.alive);
    }

    fn check_victory(&mut self, out_events: &mut Vec<Event>) {
        if self.outcome.is_none()
            && self.total > 0
            && self.spawned == self.total
            && !self.hostiles.iter().any(|hostile| hostile.alive)
        {
            self.outcome = Some(Outcome::Victory);
            out_events.push(Event::BattleEnded {
                outcome: Outcome::Victory,
            });
        }
    }

    fn spawn_hostile(
        &mut self,
        archetype: HostileArchetype,
        lane: Lane,
        out_events: &mut Vec<Event>,
    ) {
        if self.outcome.is_some() || lane.get() >= FIELD_LANES {
            return;
        }
        let stats = ArchetypeTable::hostile(archetype);
        let id = HostileId::new(self.next_hostile);
        self.next_hostile += 1;

        let mut hostile = Hostile {
            id,
            archetype,
            position: FieldPoint::new(FIELD_WIDTH, lane.center_y()),
            lane,
            health: stats.health,
            max_health: stats.health,
            speed: stats.speed,
            original_speed: stats.speed,
            calamity_damage_factor: 1.0,
            calamity_speed_factor: 1.0,
            phase: HostilePhase::Advancing,
            leap: None,
            slow: None,
            ready_at: self.clock,
            leapt: false,
            melee_fallback: false,
            alive: true,
        };

        if let Some(kind) = self.active_calamity {
            match kind.effect() {
                CalamityEffect::HostileDamage(factor) => {
                    hostile.calamity_damage_factor = factor;
                    self.allocate_effect(EffectKind::CalamityMark, EffectParent::Hostile(id), 0.0);
                }
                CalamityEffect::HostileSpeed(factor) => {
                    hostile.calamity_speed_factor = factor;
                    self.allocate_effect(EffectKind::CalamityMark, EffectParent::Hostile(id), 0.0);
                }
                CalamityEffect::DefenderDamage(_) | CalamityEffect::CullShare(_) => {}
            }
        }

        self.hostiles.push(hostile);
        self.spawned += 1;
        out_events.push(Event::HostileSpawned {
            hostile: id,
            archetype,
            lane,
        });
    }

    fn place_defender(
        &mut self,
        archetype: DefenderArchetype,
        cell: GridCell,
        out_events: &mut Vec<Event>,
    ) {
        if self.outcome.is_some() {
            return;
        }

        let reject = |reason: PlacementError, out_events: &mut Vec<Event>| {
            out_events.push(Event::PlacementRejected {
                archetype,
                cell,
                reason,
            });
        };

        if !self.roster.contains(&archetype) {
            reject(PlacementError::NotInRoster, out_events);
            return;
        }
        if !cell.in_bounds() {
            reject(PlacementError::OutOfBounds, out_events);
            return;
        }
        if self
            .defenders
            .iter()
            .any(|defender| defender.alive && defender.cell == cell)
        {
            reject(PlacementError::Occupied, out_events);
            return;
        }
        if archetype.is_producer() {
            let producers = self
                .defenders
                .iter()
                .filter(|defender| defender.alive && defender.archetype.is_producer())
                .count() as u32;
            if producers >= self.producer_slots {
                reject(PlacementError::ProducerSlotsFull, out_events);
                return;
            }
        }
        let stats = *self.table.defender(archetype);
        if self.resources < stats.cost {
            reject(PlacementError::InsufficientResources, out_events);
            return;
        }

        self.resources -= stats.cost;
        let id = DefenderId::new(self.next_defender);
        self.next_defender += 1;

        let mut calamity_factor = 1.0;
        if let Some(kind) = self.active_calamity {
            if let CalamityEffect::DefenderDamage(factor) = kind.effect() {
                calamity_factor = factor;
                self.allocate_effect(EffectKind::CalamityMark, EffectParent::Defender(id), 0.0);
            }
        }

        self.defenders.push(Defender {
            id,
            archetype,
            cell,
            position: cell.center(),
            health: stats.health,
            max_health: stats.health,
            buff_multiplier: 1.0,
            calamity_factor,
            ready_at: self.clock,
            heal_pool: stats.heal_pool,
            eaten_by: None,
            objective: None,
            alive: true,
        });

        if archetype == DefenderArchetype::Herald {
            self.allocate_effect(EffectKind::AuraRing, EffectParent::Defender(id), stats.radius);
        }

        out_events.push(Event::DefenderPlaced {
            defender: id,
            archetype,
            cell,
        });
    }

    fn collect_token(&mut self, token: TokenId, out_events: &mut Vec<Event>) {
        let Some(entry) = self
            .tokens
            .iter_mut()
            .find(|candidate| candidate.alive && candidate.id == token)
        else {
            return;
        };
        entry.alive = false;
        let value = entry.value;
        self.resources += value;
        out_events.push(Event::TokenCollected { token, value });
    }

    fn fire_projectile(&mut self, defender: DefenderId, kind: ProjectileKind) {
        let Some(index) = self.defender_index(defender) else {
            return;
        };
        let archetype = self.defenders[index].archetype;
        let stats = *self.table.defender(archetype);
        let wants_piercing = archetype == DefenderArchetype::Lancer;
        if stats.projectile_speed <= 0.0
            || (kind == ProjectileKind::Piercing) != wants_piercing
            || self.defenders[index].eaten_by.is_some()
            || self.clock < self.defenders[index].ready_at
        {
            return;
        }

        let damage = self.defenders[index].effective_damage(stats.damage);
        let position = self.defenders[index].position;
        let lane = self.defenders[index].cell.lane();
        let id = ProjectileId::new(self.next_projectile);
        self.next_projectile += 1;
        self.projectiles.push(Projectile {
            id,
            seeker: ProjectileSeeker::Hostiles,
            kind,
            lane,
            x: position.x + MUZZLE_OFFSET,
            velocity: stats.projectile_speed,
            damage,
            slow: if kind == ProjectileKind::Ballistic {
                stats.slow
            } else {
                None
            },
            struck: Vec::new(),
            alive: true,
        });
        self.defenders[index].ready_at = self.clock + stats.cooldown;
    }

    fn detonate_burst(&mut self, defender: DefenderId, center: FieldPoint) {
        let Some(index) = self.defender_index(defender) else {
            return;
        };
        if self.defenders[index].archetype != DefenderArchetype::Mortar
            || self.defenders[index].eaten_by.is_some()
            || self.clock < self.defenders[index].ready_at
        {
            return;
        }
        let stats = *self.table.defender(DefenderArchetype::Mortar);
        let damage = self.defenders[index].effective_damage(stats.damage);
        for hostile in self.hostiles.iter_mut() {
            if hostile.alive && hostile.position.distance_to(center) <= stats.radius {
                hostile.health -= damage;
            }
        }
        self.defenders[index].ready_at = self.clock + stats.cooldown;
    }

    fn produce_token(&mut self, defender: DefenderId, out_events: &mut Vec<Event>) {
        let Some(index) = self.defender_index(defender) else {
            return;
        };
        if !self.defenders[index].archetype.is_producer()
            || self.defenders[index].eaten_by.is_some()
            || self.clock < self.defenders[index].ready_at
        {
            return;
        }
        let stats = *self.table.defender(self.defenders[index].archetype);
        let position = self.defenders[index].position;
        let id = TokenId::new(self.next_token);
        self.next_token += 1;
        self.tokens.push(Token {
            id,
            position: FieldPoint::new(position.x, position.y - TOKEN_DROP_OFFSET),
            value: stats.production,
            alive: true,
        });
        self.defenders[index].ready_at = self.clock + stats.cooldown;
        out_events.push(Event::TokenEmitted { token: id });
    }

    fn heal_ally(&mut self, healer: DefenderId, ally: DefenderId) {
        let Some(healer_index) = self.defender_index(healer) else {
            return;
        };
        let Some(ally_index) = self.defender_index(ally) else {
            return;
        };
        if healer_index == ally_index {
            return;
        }
        if self.defenders[healer_index].archetype != DefenderArchetype::Mender
            || self.defenders[healer_index].eaten_by.is_some()
            || self.clock < self.defenders[healer_index].ready_at
            || self.defenders[healer_index].heal_pool <= 0.0
        {
            return;
        }
        let stats = *self.table.defender(DefenderArchetype::Mender);
        if self.defenders[healer_index]
            .position
            .distance_to(self.defenders[ally_index].position)
            > stats.radius
        {
            return;
        }

        let missing =
            self.defenders[ally_index].max_health - self.defenders[ally_index].health;
        if missing <= 0.0 {
            return;
        }
        let amount = stats
            .heal_amount
            .min(self.defenders[healer_index].heal_pool)
            .min(missing);
        self.defenders[ally_index].health += amount;
        self.defenders[healer_index].heal_pool -= amount;
        self.defenders[healer_index].ready_at = self.clock + stats.cooldown;
        if self.defenders[healer_index].heal_pool <= 0.0 {
            // Pool spent: the healer burns out through the regular death path.
            self.defenders[healer_index].health = 0.0;
        }
    }

    fn set_charger_objective(&mut self, defender: DefenderId, hostile: HostileId) {
        let Some(index) = self.defender_index(defender) else {
            return;
        };
        if self.defenders[index].archetype != DefenderArchetype::Charger {
            return;
        }
        if self.hostile_index(hostile).is_some() {
            self.defenders[index].objective = Some(hostile);
        }
    }

    fn detonate_charger(&mut self, defender: DefenderId) {
        let Some(index) = self.defender_index(defender) else {
            return;
        };
        if self.defenders[index].archetype != DefenderArchetype::Charger
            || self.defenders[index].eaten_by.is_some()
        {
            return;
        }
        let stats = *self.table.defender(DefenderArchetype::Charger);
        let damage = self.defenders[index].effective_damage(stats.damage);
        let center = self.defenders[index].position;
        for hostile in self.hostiles.iter_mut() {
            if hostile.alive && hostile.position.distance_to(center) <= stats.radius {
                hostile.health -= damage;
            }
        }
        self.defenders[index].health = 0.0;
    }

    fn fire_hostile_bolt(&mut self, hostile: HostileId) {
        let Some(index) = self.hostile_index(hostile) else {
            return;
        };
        if self.hostiles[index].phase != HostilePhase::Volleying
            || self.clock < self.hostiles[index].ready_at
        {
            return;
        }
        let stats = ArchetypeTable::hostile(self.hostiles[index].archetype);
        let damage = self.hostiles[index].effective_damage(stats.damage);
        let position = self.hostiles[index].position;
        let lane = self.hostiles[index].lane;
        let id = ProjectileId::new(self.next_projectile);
        self.next_projectile += 1;
        self.projectiles.push(Projectile {
            id,
            seeker: ProjectileSeeker::Defenders,
            kind: ProjectileKind::Ballistic,
            lane,
            x: position.x - MUZZLE_OFFSET,
            velocity: -HOSTILE_BOLT_SPEED,
            damage,
            slow: None,
            struck: Vec::new(),
            alive: true,
        });
        self.hostiles[index].ready_at = self.clock + stats.cooldown;
    }

    fn begin_strike(&mut self, hostile: HostileId, target: DefenderId) {
        let Some(hostile_index) = self.hostile_index(hostile) else {
            return;
        };
        let Some(target_index) = self.defender_index(target) else {
            return;
        };
        if self.hostiles[hostile_index].phase != HostilePhase::Advancing
            || self.defenders[target_index].cell.lane() != self.hostiles[hostile_index].lane
            || self.defenders[target_index].eaten_by.is_some()
        {
            return;
        }
        let stats = ArchetypeTable::hostile(self.hostiles[hostile_index].archetype);
        let edge = self.defenders[target_index].position.x + CONTACT_RANGE;
        self.defenders[target_index].eaten_by = Some(hostile);
        self.hostiles[hostile_index].phase = HostilePhase::Striking { target };
        self.hostiles[hostile_index].position.x = edge;
        self.hostiles[hostile_index].ready_at = self.clock + stats.cooldown;
    }

    fn halt_and_volley(&mut self, hostile: HostileId) {
        let Some(index) = self.hostile_index(hostile) else {
            return;
        };
        if self.hostiles[index].archetype != HostileArchetype::Spitter
            || self.hostiles[index].phase != HostilePhase::Advancing
        {
            return;
        }
        let stats = ArchetypeTable::hostile(HostileArchetype::Spitter);
        self.hostiles[index].phase = HostilePhase::Volleying;
        self.hostiles[index].ready_at = self.clock + stats.cooldown;
    }

    fn resume_advance(&mut self, hostile: HostileId) {
        let Some(index) = self.hostile_index(hostile) else {
            return;
        };
        if self.hostiles[index].phase == HostilePhase::Volleying {
            self.hostiles[index].phase = HostilePhase::Advancing;
        }
    }

    fn begin_leap(&mut self, hostile: HostileId, clearance_x: f32) {
        let Some(index) = self.hostile_index(hostile) else {
            return;
        };
        if self.hostiles[index].archetype != HostileArchetype::Leaper
            || self.hostiles[index].phase != HostilePhase::Advancing
            || self.hostiles[index].leapt
        {
            return;
        }
        let start_x = self.hostiles[index].position.x;
        self.hostiles[index].phase = HostilePhase::Leaping;
        self.hostiles[index].leap = Some(Leap {
            start_x,
            end_x: clearance_x,
            elapsed: Duration::ZERO,
        });
    }

    fn hunt(&mut self, hostile: HostileId, target: DefenderId) {
        let Some(index) = self.hostile_index(hostile) else {
            return;
        };
        if self.defender_index(target).is_none() {
            return;
        }
        let can_hunt = matches!(
            self.hostiles[index].archetype,
            HostileArchetype::Snatcher | HostileArchetype::Looter
        );
        let phase_allows = matches!(
            self.hostiles[index].phase,
            HostilePhase::Advancing | HostilePhase::Hunting { .. }
        );
        if can_hunt && phase_allows && !self.hostiles[index].melee_fallback {
            self.hostiles[index].phase = HostilePhase::Hunting { target };
        }
    }

    fn seize_victim(&mut self, victim_index: usize, out_events: &mut Vec<Event>) {
        let id = self.defenders[victim_index].id;
        self.defenders[victim_index].alive = false;
        self.defenders[victim_index].eaten_by = None;
        self.neutralized += 1;
        out_events.push(Event::DefenderSeized { defender: id });
        self.release_attackers(id);
    }

    fn grab_defender(&mut self, hostile: HostileId, victim: DefenderId, out_events: &mut Vec<Event>) {
        let Some(hostile_index) = self.hostile_index(hostile) else {
            return;
        };
        let Some(victim_index) = self.defender_index(victim) else {
            return;
        };
        if self.hostiles[hostile_index].phase != (HostilePhase::Hunting { target: victim }) {
            return;
        }
        let distance = self.hostiles[hostile_index]
            .position
            .distance_to(self.defenders[victim_index].position);
        if distance > GRAB_RANGE {
            return;
        }
        self.seize_victim(victim_index, out_events);
        self.hostiles[hostile_index].phase = HostilePhase::Carrying;
    }

    fn steal_producer(&mut self, hostile: HostileId, victim: DefenderId, out_events: &mut Vec<Event>) {
        let Some(hostile_index) = self.hostile_index(hostile) else {
            return;
        };
        let Some(victim_index) = self.defender_index(victim) else {
            return;
        };
        if self.hostiles[hostile_index].phase != (HostilePhase::Hunting { target: victim })
            || !self.defenders[victim_index].archetype.is_producer()
        {
            return;
        }
        let distance = self.hostiles[hostile_index]
            .position
            .distance_to(self.defenders[victim_index].position);
        if distance > GRAB_RANGE {
            return;
        }
        self.seize_victim(victim_index, out_events);
        self.hostiles[hostile_index].phase = HostilePhase::Advancing;
    }

    fn flee(&mut self, hostile: HostileId) {
        let Some(index) = self.hostile_index(hostile) else {
            return;
        };
        if matches!(
            self.hostiles[index].archetype,
            HostileArchetype::Snatcher | HostileArchetype::Looter
        ) {
            self.hostiles[index].phase = HostilePhase::Fleeing;
        }
    }

    fn adopt_melee_fallback(&mut self, hostile: HostileId) {
        if let Some(index) = self.hostile_index(hostile) {
            self.hostiles[index].melee_fallback = true;
        }
    }

    fn projectile_hit(&mut self, projectile: ProjectileId, target: StrikeTarget) {
        let clock = self.clock;
        let Some(projectile_index) = self
            .projectiles
            .iter()
            .position(|candidate| candidate.alive && candidate.id == projectile)
        else {
            return;
        };

        match target {
            StrikeTarget::Hostile(id) => {
                let Some(hostile_index) = self.hostile_index(id) else {
                    return;
                };
                let (projectiles, hostiles) = (&mut self.projectiles, &mut self.hostiles);
                let projectile = &mut projectiles[projectile_index];
                let hostile = &mut hostiles[hostile_index];
                if projectile.seeker != ProjectileSeeker::Hostiles {
                    return;
                }
                if projectile.kind == ProjectileKind::Piercing && projectile.struck.contains(&id) {
                    return;
                }
                // Slow lands before damage; reapplication refreshes the
                // expiry without stacking the factor.
                if let Some(payload) = projectile.slow {
                    hostile.slow = Some(SlowEffect {
                        until: clock + payload.duration,
                    });
                    hostile.speed = hostile.original_speed * payload.factor;
                }
                hostile.health -= projectile.damage;
                if projectile.kind == ProjectileKind::Piercing {
                    projectile.struck.push(id);
                } else {
                    projectile.alive = false;
                }
            }
            StrikeTarget::Defender(id) => {
                let Some(defender_index) = self.defender_index(id) else {
                    return;
                };
                let (projectiles, defenders) = (&mut self.projectiles, &mut self.defenders);
                let projectile = &mut projectiles[projectile_index];
                if projectile.seeker != ProjectileSeeker::Defenders {
                    return;
                }
                defenders[defender_index].health -= projectile.damage;
                projectile.alive = false;
            }
        }
    }

    fn apply_auras(&mut self, factors: Vec<(DefenderId, f32)>) {
        for defender in self.defenders.iter_mut() {
            if defender.alive {
                defender.buff_multiplier = 1.0;
            }
        }
        for (id, factor) in factors {
            if let Some(index) = self.defender_index(id) {
                self.defenders[index].buff_multiplier = factor;
            }
        }
    }

    fn activate_calamity(&mut self, kind: CalamityKind, out_events: &mut Vec<Event>) {
        if self.active_calamity.is_some() {
            return;
        }
        self.notice = Some(CalamityNotice {
            kind,
            started_at: self.clock,
            visible_until: self.clock + NOTICE_DURATION,
        });
        out_events.push(Event::CalamityStarted { kind });

        match kind.effect() {
            CalamityEffect::HostileDamage(factor) => {
                self.active_calamity = Some(kind);
                let marks: Vec<HostileId> = self
                    .hostiles
                    .iter_mut()
                    .filter(|hostile| hostile.alive)
                    .map(|hostile| {
                        hostile.calamity_damage_factor = factor;
                        hostile.id
                    })
                    .collect();
                for id in marks {
                    self.allocate_effect(EffectKind::CalamityMark, EffectParent::Hostile(id), 0.0);
                }
            }
            CalamityEffect::HostileSpeed(factor) => {
                self.active_calamity = Some(kind);
                let marks: Vec<HostileId> = self
                    .hostiles
                    .iter_mut()
                    .filter(|hostile| hostile.alive)
                    .map(|hostile| {
                        hostile.calamity_speed_factor = factor;
                        hostile.id
                    })
                    .collect();
                for id in marks {
                    self.allocate_effect(EffectKind::CalamityMark, EffectParent::Hostile(id), 0.0);
                }
            }
            CalamityEffect::DefenderDamage(factor) => {
                self.active_calamity = Some(kind);
                let marks: Vec<DefenderId> = self
                    .defenders
                    .iter_mut()
                    .filter(|defender| defender.alive)
                    .map(|defender| {
                        defender.calamity_factor = factor;
                        defender.id
                    })
                    .collect();
                for id in marks {
                    self.allocate_effect(EffectKind::CalamityMark, EffectParent::Defender(id), 0.0);
                }
            }
            // One-shot calamities never become the active effect; the
            // director follows up with the immediate action.
            CalamityEffect::CullShare(_) => {}
        }
    }

    fn expire_calamity(&mut self, out_events: &mut Vec<Event>) {
        let Some(kind) = self.active_calamity.take() else {
            return;
        };
        for hostile in self.hostiles.iter_mut() {
            hostile.calamity_damage_factor = 1.0;
            hostile.calamity_speed_factor = 1.0;
        }
        for defender in self.defenders.iter_mut() {
            defender.calamity_factor = 1.0;
        }
        for effect in self.effects.iter_mut() {
            if effect.kind == EffectKind::CalamityMark {
                effect.alive = false;
            }
        }
        out_events.push(Event::CalamityEnded { kind });
    }

    fn cull_defenders(&mut self, defenders: Vec<DefenderId>) {
        for id in defenders {
            if let Some(index) = self.defender_index(id) {
                if !self.defenders[index].archetype.is_producer() {
                    self.defenders[index].health = 0.0;
                }
            }
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => world.tick(dt, out_events),
        Command::SpawnHostile { archetype, lane } => {
            world.spawn_hostile(archetype, lane, out_events);
        }
        Command::PlaceDefender { archetype, cell } => {
            world.place_defender(archetype, cell, out_events);
        }
        Command::CollectToken { token } => world.collect_token(token, out_events),
        Command::FireProjectile { defender } => {
            world.fire_projectile(defender, ProjectileKind::Ballistic);
        }
        Command::FirePiercingWave { defender } => {
            world.fire_projectile(defender, ProjectileKind::Piercing);
        }
        Command::DetonateBurst { defender, center } => world.detonate_burst(defender, center),
        Command::ProduceToken { defender } => world.produce_token(defender, out_events),
        Command::HealAlly { healer, ally } => world.heal_ally(healer, ally),
        Command::SetChargerObjective { defender, hostile } => {
            world.set_charger_objective(defender, hostile);
        }
        Command::DetonateCharger { defender } => world.detonate_charger(defender),
        Command::FireHostileBolt { hostile } => world.fire_hostile_bolt(hostile),
        Command::BeginStrike { hostile, target } => world.begin_strike(hostile, target),
        Command::HaltAndVolley { hostile } => world.halt_and_volley(hostile),
        Command::ResumeAdvance { hostile } => world.resume_advance(hostile),
        Command::BeginLeap {
            hostile,
            clearance_x,
        } => world.begin_leap(hostile, clearance_x),
        Command::Hunt { hostile, target } => world.hunt(hostile, target),
        Command::GrabDefender { hostile, victim } => {
            world.grab_defender(hostile, victim, out_events);
        }
        Command::StealProducer { hostile, victim } => {
            world.steal_producer(hostile, victim, out_events);
        }
        Command::Flee { hostile } => world.flee(hostile),
        Command::AdoptMeleeFallback { hostile } => world.adopt_melee_fallback(hostile),
        Command::ProjectileHit { projectile, target } => world.projectile_hit(projectile, target),
        Command::ApplyAuras { factors } => world.apply_auras(factors),
        Command::ActivateCalamity { kind } => world.activate_calamity(kind, out_events),
        Command::ExpireCalamity => world.expire_calamity(out_events),
        Command::CullDefenders { defenders } => world.cull_defenders(defenders),
    }

    world.sweep_defender_deaths(out_events);
    world.sweep_hostile_deaths(out_events);
    world.cull_orphan_effects();
    world.check_victory(out_events);
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::{entities::ArchetypeTable, World};
    use lane_defence_core::{
        BattleProgress, CalamityKind, CalamityNotice, DefenderSnapshot, DefenderView,
        HostileSnapshot, HostileView, Lane, Outcome, ProjectileSnapshot, ProjectileView,
        SupportEffectSnapshot, TokenSnapshot, TokenView,
    };

    /// Aggregated battle counters for the UI and meta layers.
    #[must_use]
    pub fn battle_progress(world: &World) -> BattleProgress {
        BattleProgress {
            spawned: world.spawned,
            total: world.total,
            killed: world.killed,
            escaped: world.escaped,
            neutralized: world.neutralized,
            resources: world.resources,
            clock: world.clock,
            outcome: world.outcome,
        }
    }

    /// Captures a read-only view of every living defender.
    #[must_use]
    pub fn defender_view(world: &World) -> DefenderView {
        let snapshots: Vec<DefenderSnapshot> = world
            .defenders
            .iter()
            .filter(|defender| defender.alive)
            .map(|defender| {
                let stats = world.table.defender(defender.archetype);
                DefenderSnapshot {
                    id: defender.id,
                    archetype: defender.archetype,
                    cell: defender.cell,
                    position: defender.position,
                    health: defender.health,
                    max_health: defender.max_health,
                    damage: defender.effective_damage(stats.damage),
                    radius: stats.radius,
                    buff_factor: stats.buff_factor,
                    buff_multiplier: defender.buff_multiplier,
                    calamity_factor: defender.calamity_factor,
                    ready_in: defender.ready_at.saturating_sub(world.clock),
                    heal_pool: defender.heal_pool,
                    being_eaten: defender.eaten_by.is_some(),
                    upgraded: world.table.upgraded(defender.archetype),
                }
            })
            .collect();
        DefenderView::from_snapshots(snapshots)
    }

    /// Captures a read-only view of every living hostile.
    #[must_use]
    pub fn hostile_view(world: &World) -> HostileView {
        let snapshots: Vec<HostileSnapshot> = world
            .hostiles
            .iter()
            .filter(|hostile| hostile.alive)
            .map(|hostile| {
                let stats = ArchetypeTable::hostile(hostile.archetype);
                HostileSnapshot {
                    id: hostile.id,
                    archetype: hostile.archetype,
                    lane: hostile.lane,
                    position: hostile.position,
                    health: hostile.health,
                    max_health: hostile.max_health,
                    damage: hostile.effective_damage(stats.damage),
                    phase: hostile.phase,
                    ready_in: hostile.ready_at.saturating_sub(world.clock),
                    slowed: hostile.slow.is_some(),
                    leapt: hostile.leapt,
                    melee_fallback: hostile.melee_fallback,
                }
            })
            .collect();
        HostileView::from_snapshots(snapshots)
    }

    /// Captures a read-only view of every live projectile.
    #[must_use]
    pub fn projectile_view(world: &World) -> ProjectileView {
        let snapshots: Vec<ProjectileSnapshot> = world
            .projectiles
            .iter()
            .filter(|projectile| projectile.alive)
            .map(|projectile| ProjectileSnapshot {
                id: projectile.id,
                seeker: projectile.seeker,
                kind: projectile.kind,
                lane: projectile.lane,
                x: projectile.x,
                velocity: projectile.velocity,
                damage: projectile.damage,
                slow: projectile.slow,
                already_struck: projectile.struck.clone(),
            })
            .collect();
        ProjectileView::from_snapshots(snapshots)
    }

    /// Captures a read-only view of every uncollected resource token.
    #[must_use]
    pub fn token_view(world: &World) -> TokenView {
        let snapshots: Vec<TokenSnapshot> = world
            .tokens
            .iter()
            .filter(|token| token.alive)
            .map(|token| TokenSnapshot {
                id: token.id,
                position: token.position,
                value: token.value,
            })
            .collect();
        TokenView::from_snapshots(snapshots)
    }

    /// Enumerates the support effects bound to living entities.
    #[must_use]
    pub fn support_effects(world: &World) -> Vec<SupportEffectSnapshot> {
        world
            .effects
            .iter()
            .filter(|effect| effect.alive)
            .map(|effect| SupportEffectSnapshot {
                id: effect.id,
                kind: effect.kind,
                parent: effect.parent,
                radius: effect.radius,
            })
            .collect()
    }

    /// Lanes whose sweeper counter unit has not yet been consumed.
    #[must_use]
    pub fn sweeper_lanes(world: &World) -> Vec<Lane> {
        world
            .sweepers
            .iter()
            .enumerate()
            .filter(|(_, armed)| **armed)
            .map(|(index, _)| Lane::new(index as u32))
            .collect()
    }

    /// Transient notification record for the most recent calamity.
    #[must_use]
    pub fn calamity_notice(world: &World) -> Option<CalamityNotice> {
        world.notice
    }

    /// Kind of the currently active persistent calamity, if any.
    #[must_use]
    pub fn active_calamity(world: &World) -> Option<CalamityKind> {
        world.active_calamity
    }

    /// Terminal result of the battle, if it has concluded.
    #[must_use]
    pub fn outcome(world: &World) -> Option<Outcome> {
        world.outcome
    }
}
