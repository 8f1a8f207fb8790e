//! Target pool sizing and layout contracts, checked on the pure planning
//! layer (no GPU adapter required).

use phosphor::renderer::target_pool::{
    plan_targets, scaled_dim, target_index, PoolKey, PoolLedger, RenderTargetPool, TargetRole,
};

const SCALES: [f32; 3] = [1.0, 0.5, 0.25];

#[test]
fn plan_has_two_full_targets_plus_a_pair_per_extra_scale() {
    let plan = plan_targets(1920, 1080, &SCALES);
    assert_eq!(plan.len(), 2 + 2 * (SCALES.len() - 1));

    let single = plan_targets(1920, 1080, &[1.0]);
    assert_eq!(single.len(), 2);
}

#[test]
fn plan_roles_follow_the_pool_layout() {
    let plan = plan_targets(100, 100, &SCALES);
    let roles: Vec<TargetRole> = plan.iter().map(|s| s.role).collect();
    assert_eq!(
        roles,
        vec![
            TargetRole::Original,
            TargetRole::Bright,
            TargetRole::Scratch(0),
            TargetRole::Result(0),
            TargetRole::Scratch(1),
            TargetRole::Result(1),
        ]
    );
    // Role order agrees with the index lookup.
    for (i, spec) in plan.iter().enumerate() {
        assert_eq!(target_index(spec.role), i);
    }
}

#[test]
fn full_resolution_targets_match_the_output_size() {
    let plan = plan_targets(641, 479, &SCALES);
    assert_eq!((plan[0].width, plan[0].height), (641, 479));
    assert_eq!((plan[1].width, plan[1].height), (641, 479));
}

#[test]
fn scaled_targets_floor_their_dimensions() {
    let plan = plan_targets(101, 51, &SCALES);
    // scales[1] = 0.5
    assert_eq!((plan[2].width, plan[2].height), (50, 25));
    assert_eq!((plan[3].width, plan[3].height), (50, 25));
    // scales[2] = 0.25
    assert_eq!((plan[4].width, plan[4].height), (25, 12));
}

#[test]
fn scaled_dims_never_reach_zero() {
    assert_eq!(scaled_dim(1, 0.25), 1);
    assert_eq!(scaled_dim(3, 0.25), 1);
    let plan = plan_targets(2, 2, &[1.0, 0.1]);
    assert_eq!((plan[2].width, plan[2].height), (1, 1));
}

#[test]
fn scratch_and_result_pairs_share_dimensions() {
    let plan = plan_targets(1280, 720, &SCALES);
    for i in 0..SCALES.len() - 1 {
        let scratch = &plan[target_index(TargetRole::Scratch(i))];
        let result = &plan[target_index(TargetRole::Result(i))];
        assert_eq!((scratch.width, scratch.height), (result.width, result.height));
    }
}

#[test]
fn pool_key_is_the_resolution() {
    let key = PoolKey {
        width: 800,
        height: 600,
    };
    assert_eq!(
        key,
        PoolKey {
            width: 800,
            height: 600
        }
    );
}

// Drives the reuse/rebuild state machine exactly as acquire does: check
// needs_rebuild, then note_release + note_rebuild on a miss.
fn acquire_on(ledger: &mut PoolLedger, width: u32, height: u32, scales: &[f32]) -> bool {
    if !ledger.needs_rebuild(width, height) {
        return false;
    }
    ledger.note_release();
    ledger.note_rebuild(width, height, plan_targets(width, height, scales).len());
    true
}

#[test]
fn reacquiring_the_same_resolution_is_a_no_op() {
    let mut ledger = PoolLedger::default();
    assert!(acquire_on(&mut ledger, 800, 600, &SCALES));
    let generation = ledger.generation();
    let count = ledger.target_count();

    assert!(!acquire_on(&mut ledger, 800, 600, &SCALES));
    assert_eq!(ledger.generation(), generation);
    assert_eq!(ledger.target_count(), count);
    assert_eq!(
        ledger.key(),
        Some(PoolKey {
            width: 800,
            height: 600
        })
    );
}

#[test]
fn resize_releases_then_reallocates() {
    let mut ledger = PoolLedger::default();
    assert!(acquire_on(&mut ledger, 800, 600, &SCALES));
    assert!(acquire_on(&mut ledger, 1024, 768, &SCALES));
    assert_eq!(ledger.generation(), 2);
    assert_eq!(
        ledger.key(),
        Some(PoolKey {
            width: 1024,
            height: 768
        })
    );
}

#[test]
fn repeated_resizes_do_not_accumulate_targets() {
    let mut ledger = PoolLedger::default();
    acquire_on(&mut ledger, 800, 600, &SCALES);
    let after_one = ledger.target_count();

    for i in 0..32u32 {
        let (w, h) = (640 + i * 16, 480 + i * 9);
        acquire_on(&mut ledger, w, h, &SCALES);
    }
    // Pool size after N resizes equals the size after one, not N times it.
    assert_eq!(ledger.target_count(), after_one);
}

#[test]
fn release_clears_the_ledger() {
    let mut ledger = PoolLedger::default();
    acquire_on(&mut ledger, 800, 600, &SCALES);
    ledger.note_release();
    assert!(ledger.key().is_none());
    assert_eq!(ledger.target_count(), 0);
    assert!(ledger.needs_rebuild(800, 600));
}

#[test]
fn fresh_pool_matches_nothing() {
    let pool = RenderTargetPool::new();
    assert!(!pool.matches(800, 600));
    assert!(pool.key().is_none());
    assert_eq!(pool.generation(), 0);
    assert_eq!(pool.target_count(), 0);
}
