//! Pass-schedule contracts: the frame plan is pure data, so the wiring of
//! the blur cascade and the combine inputs is checked directly.

use phosphor::renderer::target_pool::target_index;
use phosphor::renderer::{build_frame_plan, usable_scales, PassDesc, TargetRole, MAX_BLOOM_LAYERS};

const SCALES: [f32; 3] = [1.0, 0.5, 0.25];

#[test]
fn plan_runs_upload_bright_blurs_combine_in_order() {
    let plan = build_frame_plan(&SCALES);
    assert_eq!(plan.len(), 2 + 2 * (SCALES.len() - 1) + 1);

    assert_eq!(plan[0], PassDesc::Upload);
    assert!(matches!(plan[1], PassDesc::BrightPass { .. }));
    assert!(plan[2..plan.len() - 1]
        .iter()
        .all(|p| matches!(p, PassDesc::Blur { .. })));
    assert!(matches!(plan[plan.len() - 1], PassDesc::Combine { .. }));
}

#[test]
fn bright_pass_reads_the_original() {
    let plan = build_frame_plan(&SCALES);
    assert_eq!(
        plan[1],
        PassDesc::BrightPass {
            src: TargetRole::Original,
            dst: TargetRole::Bright,
        }
    );
}

#[test]
fn first_blur_stage_reads_the_bright_target() {
    let plan = build_frame_plan(&SCALES);
    let PassDesc::Blur { src, dst, horizontal, .. } = plan[2] else {
        panic!("expected a blur pass");
    };
    assert_eq!(src, TargetRole::Bright);
    assert_eq!(dst, TargetRole::Scratch(0));
    assert!(horizontal);
}

#[test]
fn cascade_stages_chain_through_previous_results() {
    let plan = build_frame_plan(&[1.0, 0.5, 0.25, 0.125]);
    let blurs: Vec<_> = plan
        .iter()
        .filter_map(|p| match *p {
            PassDesc::Blur {
                src,
                dst,
                horizontal,
                ..
            } => Some((src, dst, horizontal)),
            _ => None,
        })
        .collect();

    assert_eq!(blurs.len(), 6);
    for (stage, pair) in blurs.chunks(2).enumerate() {
        let expected_src = if stage == 0 {
            TargetRole::Bright
        } else {
            TargetRole::Result(stage - 1)
        };
        // Horizontal into scratch, then vertical scratch into result.
        assert_eq!(pair[0], (expected_src, TargetRole::Scratch(stage), true));
        assert_eq!(
            pair[1],
            (TargetRole::Scratch(stage), TargetRole::Result(stage), false)
        );
    }
}

#[test]
fn blur_never_reads_the_original() {
    let plan = build_frame_plan(&[1.0, 0.5, 0.25, 0.125]);
    for pass in &plan {
        if let PassDesc::Blur { src, .. } = pass {
            assert_ne!(*src, TargetRole::Original);
        }
    }
}

#[test]
fn blur_passes_carry_their_stage_scale() {
    let plan = build_frame_plan(&SCALES);
    let scales: Vec<f32> = plan
        .iter()
        .filter_map(|p| match *p {
            PassDesc::Blur { scale, .. } => Some(scale),
            _ => None,
        })
        .collect();
    assert_eq!(scales, vec![0.5, 0.5, 0.25, 0.25]);
}

#[test]
fn combine_reads_original_and_all_results() {
    let plan = build_frame_plan(&SCALES);
    let PassDesc::Combine { original, layers } = plan[plan.len() - 1] else {
        panic!("expected a combine pass");
    };
    assert_eq!(original, TargetRole::Original);
    assert_eq!(
        layers,
        [
            TargetRole::Result(0),
            TargetRole::Result(1),
            TargetRole::Bright,
        ]
    );
}

#[test]
fn missing_layers_fall_back_to_the_bright_target() {
    let plan = build_frame_plan(&[1.0]);
    let PassDesc::Combine { layers, .. } = plan[plan.len() - 1] else {
        panic!("expected a combine pass");
    };
    assert_eq!(layers, [TargetRole::Bright; MAX_BLOOM_LAYERS]);

    let plan = build_frame_plan(&[1.0, 0.5]);
    let PassDesc::Combine { layers, .. } = plan[plan.len() - 1] else {
        panic!("expected a combine pass");
    };
    assert_eq!(
        layers,
        [
            TargetRole::Result(0),
            TargetRole::Bright,
            TargetRole::Bright,
        ]
    );
}

#[test]
fn scales_added_between_frames_wait_for_the_next_rebuild() {
    // A pool allocated for three scales holds six targets. A fourth scale
    // pushed into the live parameters must not schedule passes against
    // targets that pool never allocated.
    let pool_targets = 2 + 2 * (SCALES.len() - 1);
    let grown = [1.0, 0.5, 0.25, 0.125];

    let clamped = usable_scales(&grown, pool_targets);
    assert_eq!(clamped, &SCALES);

    let plan = build_frame_plan(clamped);
    for pass in &plan {
        let roles: Vec<TargetRole> = match *pass {
            PassDesc::Upload => vec![],
            PassDesc::BrightPass { src, dst } => vec![src, dst],
            PassDesc::Blur { src, dst, .. } => vec![src, dst],
            PassDesc::Combine { original, layers } => {
                let mut r = vec![original];
                r.extend(layers);
                r
            }
        };
        for role in roles {
            assert!(target_index(role) < pool_targets);
        }
    }
}

#[test]
fn matching_scale_lists_pass_through_unclamped() {
    assert_eq!(usable_scales(&SCALES, 6), &SCALES);
    assert_eq!(usable_scales(&[1.0, 0.5], 6), &[1.0, 0.5]);
    assert_eq!(usable_scales(&[1.0], 2), &[1.0]);
}

#[test]
fn single_target_pair_clamps_to_no_cascade() {
    let clamped = usable_scales(&[1.0, 0.5, 0.25], 2);
    assert_eq!(clamped, &[1.0]);
    let plan = build_frame_plan(clamped);
    assert!(plan.iter().all(|p| !matches!(p, PassDesc::Blur { .. })));
}

#[test]
fn single_scale_plan_skips_the_cascade() {
    let plan = build_frame_plan(&[1.0]);
    assert_eq!(plan.len(), 3);
    assert!(plan.iter().all(|p| !matches!(p, PassDesc::Blur { .. })));
}
