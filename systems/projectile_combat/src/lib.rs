#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Projectile collision pass.
//!
//! Tests every live projectile against the opposing faction in its lane and
//! reports hits as commands. The world owns the consequences: slow payload,
//! damage, projectile destruction, and the piercing already-struck record.
//! Melee contact damage is part of the hostile integration, not this pass.

use lane_defence_core::{
    Command, DefenderView, HostileSnapshot, HostileView, ProjectileKind, ProjectileSeeker,
    ProjectileSnapshot, ProjectileView, StrikeTarget, PROJECTILE_HIT_RANGE,
};

/// Pure system that resolves projectile collisions into hit commands.
#[derive(Debug, Default)]
pub struct ProjectileCombat;

impl ProjectileCombat {
    /// Creates a new projectile combat system.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Emits one hit command per resolved collision.
    pub fn handle(
        &mut self,
        projectiles: &ProjectileView,
        hostiles: &HostileView,
        defenders: &DefenderView,
        out: &mut Vec<Command>,
    ) {
        for projectile in projectiles.iter() {
            match projectile.seeker {
                ProjectileSeeker::Hostiles => resolve_against_hostiles(projectile, hostiles, out),
                ProjectileSeeker::Defenders => {
                    resolve_against_defenders(projectile, defenders, out);
                }
            }
        }
    }
}

fn overlaps(projectile_x: f32, target_x: f32) -> bool {
    (projectile_x - target_x).abs() <= PROJECTILE_HIT_RANGE
}

fn resolve_against_hostiles(
    projectile: &ProjectileSnapshot,
    hostiles: &HostileView,
    out: &mut Vec<Command>,
) {
    match projectile.kind {
        ProjectileKind::Ballistic => {
            let mut best: Option<(f32, &HostileSnapshot)> = None;
            for hostile in hostiles.iter() {
                if hostile.lane != projectile.lane || !overlaps(projectile.x, hostile.position.x) {
                    continue;
                }
                let gap = (projectile.x - hostile.position.x).abs();
                match best {
                    Some((closest, _)) if gap >= closest => {}
                    _ => best = Some((gap, hostile)),
                }
            }
            if let Some((_, hostile)) = best {
                out.push(Command::ProjectileHit {
                    projectile: projectile.id,
                    target: StrikeTarget::Hostile(hostile.id),
                });
            }
        }
        ProjectileKind::Piercing => {
            for hostile in hostiles.iter() {
                if hostile.lane == projectile.lane
                    && overlaps(projectile.x, hostile.position.x)
                    && !projectile.already_struck.contains(&hostile.id)
                {
                    out.push(Command::ProjectileHit {
                        projectile: projectile.id,
                        target: StrikeTarget::Hostile(hostile.id),
                    });
                }
            }
        }
    }
}

fn resolve_against_defenders(
    projectile: &ProjectileSnapshot,
    defenders: &DefenderView,
    out: &mut Vec<Command>,
) {
    let mut best: Option<(f32, StrikeTarget)> = None;
    for defender in defenders.iter() {
        if defender.cell.lane() != projectile.lane || !overlaps(projectile.x, defender.position.x)
        {
            continue;
        }
        let gap = (projectile.x - defender.position.x).abs();
        match best {
            Some((closest, _)) if gap >= closest => {}
            _ => best = Some((gap, StrikeTarget::Defender(defender.id))),
        }
    }
    if let Some((_, target)) = best {
        out.push(Command::ProjectileHit {
            projectile: projectile.id,
            target,
        });
    }
}
