use {crate::FocusMode, base::Vec2};

/// Pick the best capture size for a target surface.
///
/// Sizes below `min_pixels` and sizes whose aspect ratio is further than
/// `max_distortion` from the target's are discarded. Portrait sizes are
/// compared in landscape orientation. A size exactly matching the target
/// wins outright, otherwise the largest remaining size is used. If nothing
/// qualifies, `fallback` is returned.
pub fn choose_size(
    supported: &[Vec2<usize>],
    target: Vec2<usize>,
    min_pixels: usize,
    max_distortion: f64,
    fallback: Option<Vec2<usize>>,
) -> Option<Vec2<usize>> {
    let mut sizes = supported.to_vec();
    sizes.sort_by(|a, b| b.area().cmp(&a.area()));
    log::debug!(
        "supported sizes: {}",
        sizes.iter().map(|s| s.to_string()).collect::<Vec<_>>().join(" ")
    );

    let target = target.landscape();
    let target_aspect = target.aspect();

    let mut largest = None;
    for size in sizes {
        if size.area() < min_pixels {
            continue;
        }
        let oriented = size.landscape();
        if (oriented.aspect() - target_aspect).abs() > max_distortion {
            continue;
        }
        if oriented == target {
            log::info!("found size exactly matching target: {}", size);
            return Some(size);
        }
        // sorted descending, so the first survivor is the largest
        largest.get_or_insert(size);
    }

    match largest {
        Some(size) => {
            log::info!("using largest suitable size: {}", size);
            Some(size)
        }
        None => {
            log::info!("no suitable sizes, falling back to {:?}", fallback);
            fallback
        }
    }
}

/// Pick the first mode of `preference` that the device supports.
pub fn choose_focus_mode(supported: &[FocusMode], preference: &[FocusMode]) -> Option<FocusMode> {
    let mode = preference
        .iter()
        .copied()
        .find(|mode| supported.contains(mode));
    if mode.is_none() {
        log::info!(
            "no supported focus mode among {:?} (device offers {:?})",
            preference,
            supported
        );
    }
    mode
}
