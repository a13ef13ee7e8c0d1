// Stateless Decode Harness - GOP Ordering
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Presentation order for one group of pictures, computed from the frame
// classifier alone. Two algorithms exist, picked by the codec family:
//
//   * reference-index: B frames are presented right before the frame
//     they use as backward reference, I/P frames in decode order.
//   * picture-order-count: frames are presented by ascending POC, one
//     step at a time, starting from the I frame.

use crate::error::ScheduleError;
use crate::preset::classify::{classify, reference_of};
use crate::preset::{CodingType, Preset, ReferenceDescriptor, SchedulingMode};

/// Presentation order computed for one GOP.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GopPlan {
    /// Decode index of the GOP's I frame.
    pub start: usize,
    /// First decode index past the GOP (next I frame or end of table).
    pub end: usize,
    /// Decode indices in presentation order.
    pub order: Vec<usize>,
}

impl GopPlan {
    /// Coded frames covered by the GOP.
    pub fn span(&self) -> usize {
        self.end - self.start
    }

    /// Frames this GOP will present.
    pub fn display_count(&self) -> usize {
        self.order.len()
    }
}

fn backward_ref_index(preset: &Preset, index: usize) -> Result<usize, ScheduleError> {
    match reference_of(Some(preset), index)? {
        ReferenceDescriptor::BackwardRef(r) => Ok(r),
        ReferenceDescriptor::PictureOrderCount(_) => Ok(0),
    }
}

fn picture_order_count(preset: &Preset, index: usize) -> Result<i32, ScheduleError> {
    match reference_of(Some(preset), index)? {
        ReferenceDescriptor::PictureOrderCount(poc) => Ok(poc),
        // No counter: present in decode order.
        ReferenceDescriptor::BackwardRef(_) => Ok(index as i32),
    }
}

fn check_start(preset: &Preset, start: usize) -> Result<(), ScheduleError> {
    if start >= preset.frames_count() {
        return Err(ScheduleError::IndexOutOfRange {
            index: start,
            frames_count: preset.frames_count(),
        });
    }
    Ok(())
}

/// Order a GOP of a reference-index codec.
pub fn plan_reference_index(preset: &Preset, start: usize) -> Result<GopPlan, ScheduleError> {
    check_start(preset, start)?;
    let frames_count = preset.frames_count();
    let mut order = Vec::new();
    let mut index = start;

    while index < frames_count {
        let pct = classify(Some(preset), index)?;

        // I frames mark GOP end.
        if pct == CodingType::I && index > start {
            break;
        }

        if pct == CodingType::B {
            // Backward reference already available: present in place.
            // Otherwise the frame went in ahead of its reference below.
            if backward_ref_index(preset, index)? >= index {
                order.push(index);
            }
            index += 1;
            continue;
        }

        for k in (index + 1)..frames_count {
            if classify(Some(preset), k)? == CodingType::B
                && backward_ref_index(preset, k)? == index
            {
                order.push(k);
            }
        }

        order.push(index);
        index += 1;
    }

    Ok(GopPlan {
        start,
        end: index,
        order,
    })
}

/// Order a GOP of a picture-order-count codec. Frames whose POC is not
/// reachable by unit steps from the I frame are left out.
pub fn plan_picture_order(preset: &Preset, start: usize) -> Result<GopPlan, ScheduleError> {
    check_start(preset, start)?;
    let frames_count = preset.frames_count();

    let mut end = start + 1;
    while end < frames_count && classify(Some(preset), end)? != CodingType::I {
        end += 1;
    }

    let pocs = (start..end)
        .map(|i| picture_order_count(preset, i))
        .collect::<Result<Vec<_>, _>>()?;

    let mut order = vec![start];
    let mut last_poc = pocs[0];

    // Rescan from the GOP start after every match: POCs need not follow
    // bitstream order. GOPs are small so the quadratic walk is fine.
    while let Some(next_poc) = last_poc.checked_add(1) {
        let Some(offset) = pocs.iter().position(|&poc| poc == next_poc) else {
            break;
        };
        order.push(start + offset);
        last_poc = next_poc;
    }

    Ok(GopPlan { start, end, order })
}

/// Plan the GOP starting at `index`. Returns `None` when `index` is not an
/// I frame (scheduling only happens at GOP boundaries).
pub fn plan_gop(preset: &Preset, index: usize) -> Result<Option<GopPlan>, ScheduleError> {
    if classify(Some(preset), index)? != CodingType::I {
        return Ok(None);
    }

    let plan = match preset.scheduling() {
        SchedulingMode::ReferenceIndex => plan_reference_index(preset, index)?,
        SchedulingMode::PictureOrderCount => plan_picture_order(preset, index)?,
    };
    Ok(Some(plan))
}

/// Plans for every GOP of the preset, in decode order.
pub fn plan_all(preset: &Preset) -> Result<Vec<GopPlan>, ScheduleError> {
    let mut plans = Vec::new();
    for index in 0..preset.frames_count() {
        if let Some(plan) = plan_gop(preset, index)? {
            plans.push(plan);
        }
    }
    Ok(plans)
}
