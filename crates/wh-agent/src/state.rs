//! The agent state machine: an explicit enum and transition table rather
//! than virtual dispatch, since there are exactly five states and the
//! transitions between them never vary by agent.

/// Where an agent is in the lifecycle of its current task.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum AgentState {
    /// No bound order; awaiting assignment.
    Idle,
    /// En route to the current task's source cell.
    MovingToSource,
    /// Standing at the source, removing the pallet from its stack. Takes
    /// exactly one tick.
    Grabbing,
    /// En route to the current task's target cell, carrying a pallet.
    MovingToTarget,
    /// Standing at the target, placing the carried pallet. Takes exactly
    /// one tick.
    Dropping,
    /// The planner failed to find a path `R_max` times in a row; waiting to
    /// be released back to the order pool.
    Stuck,
}

/// An event the tick loop reports to advance an agent's state.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum AgentEvent {
    OrderAssigned,
    ReachedSource,
    GrabComplete,
    /// `Grabbing` was attempted but the pallet wasn't at the top of its
    /// stack — another task got there first. The agent yields and re-plans.
    GrabBlocked,
    ReachedTarget,
    DropComplete,
    PlanFailed,
    /// The pool released a `Stuck` agent back to `Idle` after reassignment.
    Released,
}

/// The explicit `Idle -> MovingToSource -> Grabbing -> MovingToTarget ->
/// Dropping -> Idle` transition table, plus the `Stuck` side channel.
/// Events that don't apply to the current state are no-ops.
pub fn transition(state: AgentState, event: AgentEvent) -> AgentState {
    use AgentEvent::*;
    use AgentState::*;

    match (state, event) {
        (Idle, OrderAssigned) => MovingToSource,
        (MovingToSource, ReachedSource) => Grabbing,
        (Grabbing, GrabComplete) => MovingToTarget,
        (Grabbing, GrabBlocked) => MovingToSource,
        (MovingToTarget, ReachedTarget) => Dropping,
        (Dropping, DropComplete) => Idle,
        (_, PlanFailed) => Stuck,
        (Stuck, Released) => Idle,
        (current, _) => current,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use AgentEvent::*;
    use AgentState::*;

    #[test]
    fn full_cycle_returns_to_idle() {
        let mut s = Idle;
        for event in [OrderAssigned, ReachedSource, GrabComplete, ReachedTarget, DropComplete] {
            s = transition(s, event);
        }
        assert_eq!(s, Idle);
    }

    #[test]
    fn plan_failure_from_any_state_goes_stuck() {
        assert_eq!(transition(MovingToSource, PlanFailed), Stuck);
        assert_eq!(transition(MovingToTarget, PlanFailed), Stuck);
    }

    #[test]
    fn grab_blocked_sends_agent_back_to_source() {
        assert_eq!(transition(Grabbing, GrabBlocked), MovingToSource);
    }

    #[test]
    fn irrelevant_event_is_a_no_op() {
        assert_eq!(transition(Idle, ReachedSource), Idle);
    }
}
