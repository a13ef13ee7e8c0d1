// Stateless Decode Harness - GOP Scheduler
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Owns the display queue and decides when a new GOP must be ordered.
// A pass runs only when the decode cursor sits on an I frame it has not
// been triggered at yet; repeated calls at the same cursor are no-ops.

pub mod plan;
pub mod queue;

use std::collections::VecDeque;
use tracing::{debug, warn};

use crate::error::{PresetError, QueueError, ScheduleError};
use crate::preset::Preset;
pub use plan::{plan_all, plan_gop, GopPlan};
pub use queue::{DisplayQueue, DISPLAY_QUEUE_CAPACITY};

/// Result of one scheduling pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleOutcome {
    pub plan: GopPlan,
    /// Entries that did not fit in the queue. They will never be displayed.
    pub dropped: usize,
}

impl ScheduleOutcome {
    /// Change this pass applies to the expected total display count, which
    /// starts out as the number of coded frames.
    pub fn display_delta(&self) -> isize {
        (self.plan.display_count() - self.dropped) as isize - self.plan.span() as isize
    }
}

#[derive(Debug, Clone)]
pub struct SchedulerState {
    queue: DisplayQueue,
    /// Decode cursor of the last trigger. `None` until the first pass.
    gop_anchor: Option<usize>,
    /// End of the range covered by the last pass.
    scheduled_until: usize,
}

impl SchedulerState {
    pub fn new(capacity: usize) -> Self {
        Self {
            queue: DisplayQueue::new(capacity),
            gop_anchor: None,
            scheduled_until: 0,
        }
    }

    pub fn queue(&self) -> &DisplayQueue {
        &self.queue
    }

    pub fn gop_anchor(&self) -> Option<usize> {
        self.gop_anchor
    }

    pub fn scheduled_until(&self) -> usize {
        self.scheduled_until
    }

    /// Head of the display queue.
    pub fn next(&self) -> Result<usize, QueueError> {
        self.queue.peek()
    }

    /// Consume the head of the display queue.
    pub fn dequeue(&mut self) -> Result<usize, QueueError> {
        self.queue.dequeue()
    }

    /// Run a scheduling pass for the decode cursor `index` if one is due.
    pub fn schedule(
        &mut self,
        preset: &Preset,
        index: usize,
    ) -> Result<Option<ScheduleOutcome>, ScheduleError> {
        if index >= preset.frames_count() {
            return Err(ScheduleError::IndexOutOfRange {
                index,
                frames_count: preset.frames_count(),
            });
        }

        if self.gop_anchor == Some(index) {
            return Ok(None);
        }
        self.gop_anchor = Some(index);

        let Some(plan) = plan_gop(preset, index)? else {
            return Ok(None);
        };

        let mut dropped = 0;
        for &entry in &plan.order {
            if let Err(e) = self.queue.enqueue(entry) {
                warn!("[GOP] Unable to queue frame {} for display: {}", entry, e);
                dropped += 1;
            }
        }

        debug!(
            "[GOP] Scheduled GOP {}..{}: {:?} ({} dropped)",
            plan.start, plan.end, plan.order, dropped
        );

        self.scheduled_until = plan.end;
        Ok(Some(ScheduleOutcome { plan, dropped }))
    }

    /// Forget all pending entries and scheduling history.
    pub fn reset(&mut self) {
        self.queue.clear();
        self.gop_anchor = None;
        self.scheduled_until = 0;
    }
}

impl Default for SchedulerState {
    fn default() -> Self {
        Self::new(DISPLAY_QUEUE_CAPACITY)
    }
}

/// Fail fast when a GOP could overflow the display queue. Follows the
/// driver's cursor walk over the whole preset: plans are queued when the
/// decode cursor reaches their I frame, entries leave the queue as they are
/// displayed. The peak queue length must stay within `capacity`.
pub fn validate_capacity(preset: &Preset, capacity: usize) -> Result<Vec<GopPlan>, PresetError> {
    let plans = plan_all(preset).map_err(|e| PresetError::Malformed {
        preset: preset.name.clone(),
        reason: e.to_string(),
    })?;

    let peak = peak_occupancy(preset.frames_count(), &plans);
    if let Some((start, occupancy)) = peak.filter(|&(_, occupancy)| occupancy > capacity) {
        return Err(PresetError::GopTooLarge {
            start,
            occupancy,
            capacity,
        });
    }

    Ok(plans)
}

/// Largest queue length reached during playback, with the start of the GOP
/// whose scheduling produced it.
fn peak_occupancy(frames_count: usize, plans: &[GopPlan]) -> Option<(usize, usize)> {
    let mut pending = plans.iter().peekable();
    let mut queue: VecDeque<usize> = VecDeque::new();
    let mut until = 0;
    let mut decode = 0;
    let mut peak: Option<(usize, usize)> = None;

    loop {
        if let Some(plan) = pending.next_if(|p| p.start == decode) {
            queue.extend(plan.order.iter().copied());
            until = plan.end;
            if peak.map_or(true, |(_, len)| queue.len() > len) {
                peak = Some((plan.start, queue.len()));
            }
        }

        let Some(&head) = queue.front() else {
            if decode < until {
                decode += 1;
                continue;
            }
            break;
        };

        if head > decode {
            decode += 1;
            continue;
        }

        queue.pop_front();
        if head >= decode {
            decode += 1;
        }
        if decode >= frames_count && queue.is_empty() {
            break;
        }
    }

    peak
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preset::{catalog, FramePayload};

    fn mpeg2_ipbb() -> Preset {
        let frames: Vec<FramePayload> = serde_json::from_str(
            r#"[
                {"mpeg2": {"picture_coding_type": "I"}},
                {"mpeg2": {"picture_coding_type": "P"}},
                {"mpeg2": {"picture_coding_type": "B", "backward_ref_index": 1}},
                {"mpeg2": {"picture_coding_type": "B", "backward_ref_index": 1}},
                {"mpeg2": {"picture_coding_type": "P", "forward_ref_index": 1}}
            ]"#,
        )
        .unwrap();
        Preset::from_info(catalog::find("bbb-mpeg2").unwrap(), frames).unwrap()
    }

    fn drain(state: &mut SchedulerState) -> Vec<usize> {
        let mut out = Vec::new();
        while let Ok(i) = state.dequeue() {
            out.push(i);
        }
        out
    }

    #[test]
    fn test_first_pass_schedules_at_zero() {
        let preset = mpeg2_ipbb();
        let mut state = SchedulerState::default();
        assert_eq!(state.gop_anchor(), None);

        let outcome = state.schedule(&preset, 0).unwrap().unwrap();
        assert_eq!(outcome.dropped, 0);
        assert_eq!(outcome.display_delta(), 0);
        assert_eq!(state.scheduled_until(), 5);
        assert_eq!(drain(&mut state), vec![0, 2, 3, 1, 4]);
    }

    #[test]
    fn test_repeat_call_at_same_cursor_is_noop() {
        let preset = mpeg2_ipbb();
        let mut state = SchedulerState::default();
        state.schedule(&preset, 0).unwrap();
        let len = state.queue().len();

        assert!(state.schedule(&preset, 0).unwrap().is_none());
        assert_eq!(state.queue().len(), len);
    }

    #[test]
    fn test_non_boundary_cursor_moves_anchor_only() {
        let preset = mpeg2_ipbb();
        let mut state = SchedulerState::default();
        state.schedule(&preset, 0).unwrap();
        assert!(state.schedule(&preset, 1).unwrap().is_none());
        assert_eq!(state.gop_anchor(), Some(1));
        assert_eq!(state.queue().len(), 5);
    }

    #[test]
    fn test_out_of_range_cursor_is_fatal() {
        let preset = mpeg2_ipbb();
        let mut state = SchedulerState::default();
        assert!(state.schedule(&preset, 5).is_err());
        assert_eq!(state.gop_anchor(), None);
    }

    #[test]
    fn test_queue_overflow_is_reported_not_fatal() {
        let preset = mpeg2_ipbb();
        let mut state = SchedulerState::new(3);
        let outcome = state.schedule(&preset, 0).unwrap().unwrap();
        assert_eq!(outcome.dropped, 2);
        assert_eq!(outcome.display_delta(), -2);
        assert_eq!(drain(&mut state), vec![0, 2, 3]);
    }

    #[test]
    fn test_reset_allows_rescheduling() {
        let preset = mpeg2_ipbb();
        let mut state = SchedulerState::default();
        state.schedule(&preset, 0).unwrap();
        state.reset();
        assert!(state.queue().is_empty());
        assert!(state.schedule(&preset, 0).unwrap().is_some());
    }

    #[test]
    fn test_capacity_counts_only_undisplayed_entries() {
        // GOP 0 queues [0, 3, 1]; frame 3 is still pending when the cursor
        // reaches the I frame at 2, so the peak is 3 entries, not 3 + 1.
        let frames: Vec<FramePayload> = serde_json::from_str(
            r#"[
                {"mpeg2": {"picture_coding_type": "I"}},
                {"mpeg2": {"picture_coding_type": "P"}},
                {"mpeg2": {"picture_coding_type": "I"}},
                {"mpeg2": {"picture_coding_type": "B", "forward_ref_index": 2, "backward_ref_index": 1}}
            ]"#,
        )
        .unwrap();
        let preset = Preset::from_info(catalog::find("bbb-mpeg2").unwrap(), frames).unwrap();

        assert_eq!(peak_occupancy(preset.frames_count(), &plan_all(&preset).unwrap()), Some((0, 3)));
        assert_eq!(validate_capacity(&preset, 3).unwrap().len(), 2);
        assert!(matches!(
            validate_capacity(&preset, 2),
            Err(PresetError::GopTooLarge { start: 0, occupancy: 3, capacity: 2 })
        ));
    }

    #[test]
    fn test_validate_capacity() {
        let preset = mpeg2_ipbb();
        assert_eq!(validate_capacity(&preset, 64).unwrap().len(), 1);
        assert!(matches!(
            validate_capacity(&preset, 4),
            Err(PresetError::GopTooLarge { occupancy: 5, capacity: 4, .. })
        ));
    }
}
