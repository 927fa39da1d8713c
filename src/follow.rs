//! Map-follow state machine.
//!
//! While following, the camera pans to every position update. Any manual map
//! interaction (drag start, zoom change) pauses following and arms a resume
//! timer; the timer is single-instance: a new interaction replaces the
//! pending one rather than stacking. When the timer fires, following resumes
//! and the camera recenters on the last known position.
//!
//! [`FollowTracker`] is the pure state machine: callers feed it events and
//! apply the returned [`CameraAction`]s. Timer cancellation is expressed with
//! generation-numbered [`TimerId`]s: only the most recently issued id is
//! live, so a stale timer firing is a no-op and the caller never has to
//! cancel anything explicitly. [`run_session_loop`] is the async driver that
//! wires the tracker to real tokio timers and channels.

use std::time::Duration;

use crate::GpsPoint;

/// Default idle time before following resumes after an interaction.
pub const RESUME_DELAY: Duration = Duration::from_secs(10);

/// Camera zoom applied on the first position fix.
pub const INITIAL_ZOOM: f64 = 14.0;

/// Whether the camera currently tracks the user's position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowState {
    Following,
    Paused,
}

/// Identifies one armed resume timer. Only the most recently issued id is
/// live; earlier ids are stale and ignored when they fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerId(u64);

/// A resume timer for the caller to schedule, replacing any pending one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResumeTimer {
    pub id: TimerId,
    pub delay: Duration,
}

/// Camera command produced by a state transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraAction {
    /// First fix of the session: center and apply the initial zoom.
    CenterAndZoom(GpsPoint),
    /// Pan to the position, keeping the current zoom.
    Pan(GpsPoint),
    /// Leave the camera alone.
    None,
}

/// The follow/pause state machine.
#[derive(Debug)]
pub struct FollowTracker {
    state: FollowState,
    has_centered: bool,
    timer_seq: u64,
    resume_delay: Duration,
}

impl Default for FollowTracker {
    fn default() -> Self {
        Self::new(RESUME_DELAY)
    }
}

impl FollowTracker {
    /// Create a tracker with the given resume delay. Starts in
    /// [`FollowState::Following`] with no position seen yet.
    pub fn new(resume_delay: Duration) -> Self {
        Self {
            state: FollowState::Following,
            has_centered: false,
            timer_seq: 0,
            resume_delay,
        }
    }

    pub fn state(&self) -> FollowState {
        self.state
    }

    pub fn is_following(&self) -> bool {
        self.state == FollowState::Following
    }

    /// A manual map interaction: pause following and return the replacement
    /// resume timer. Any previously issued timer id becomes stale.
    pub fn on_interaction(&mut self) -> ResumeTimer {
        self.state = FollowState::Paused;
        self.timer_seq += 1;
        ResumeTimer {
            id: TimerId(self.timer_seq),
            delay: self.resume_delay,
        }
    }

    /// A resume timer fired. Stale timers (superseded by a later
    /// interaction) do nothing; the live timer resumes following and
    /// recenters on the last known position, if there is one.
    pub fn on_timer(&mut self, id: TimerId, last_position: Option<GpsPoint>) -> CameraAction {
        if id != TimerId(self.timer_seq) {
            return CameraAction::None;
        }
        self.state = FollowState::Following;
        match last_position {
            Some(pos) => CameraAction::Pan(pos),
            None => CameraAction::None,
        }
    }

    /// A new position arrived. The first update of the session forces an
    /// initial center-and-zoom regardless of state; afterwards the camera
    /// pans only while following. The position marker itself is the
    /// session's concern and updates on every event either way.
    pub fn on_position(&mut self, position: GpsPoint) -> CameraAction {
        if !self.has_centered {
            self.has_centered = true;
            return CameraAction::CenterAndZoom(position);
        }
        match self.state {
            FollowState::Following => CameraAction::Pan(position),
            FollowState::Paused => CameraAction::None,
        }
    }
}

/// Manual map interactions consumed by [`run_session_loop`]. Both kinds
/// pause following.
#[derive(Debug, Clone, Copy)]
pub enum InteractionEvent {
    DragStart,
    ZoomChanged,
}

/// Drive a [`Session`](crate::session::Session) from live event sources.
///
/// Positions arrive on a `watch` channel, which keeps only the latest value:
/// a burst of updates collapses to the newest one, never a queue.
/// Interactions arrive on an `mpsc` channel. One resettable sleep is the
/// single resume timer; a new interaction resets it in place. The loop runs
/// until both channels close.
pub async fn run_session_loop<M: crate::session::MapSurface>(
    session: &mut crate::session::Session<M>,
    mut positions: tokio::sync::watch::Receiver<Option<GpsPoint>>,
    mut interactions: tokio::sync::mpsc::Receiver<InteractionEvent>,
) {
    let resume = tokio::time::sleep(Duration::ZERO);
    tokio::pin!(resume);
    let mut pending: Option<TimerId> = None;
    let mut positions_open = true;
    let mut interactions_open = true;

    while positions_open || interactions_open || pending.is_some() {
        tokio::select! {
            changed = positions.changed(), if positions_open => {
                match changed {
                    Ok(()) => {
                        let latest = *positions.borrow_and_update();
                        if let Some(pos) = latest {
                            session.position_update(pos);
                        }
                    }
                    Err(_) => positions_open = false,
                }
            }
            event = interactions.recv(), if interactions_open => {
                match event {
                    Some(InteractionEvent::DragStart | InteractionEvent::ZoomChanged) => {
                        let timer = session.map_interaction();
                        resume.as_mut().reset(tokio::time::Instant::now() + timer.delay);
                        pending = Some(timer.id);
                    }
                    None => interactions_open = false,
                }
            }
            () = resume.as_mut(), if pending.is_some() => {
                if let Some(id) = pending.take() {
                    session.resume_timer_fired(id);
                }
            }
        }
    }
}
