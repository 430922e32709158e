use crate::action::Action;
use crate::snapshot::GameSnapshot;

/// Decision-making capability for computer-controlled seats.
///
/// Implementations only ever see a [`GameSnapshot`] masked for their own
/// seat, so they cannot peek at other hands or mutate the table.
///
/// # Example Implementation
///
/// ```rust
/// use holdem_engine::action::Action;
/// use holdem_engine::snapshot::GameSnapshot;
/// use holdem_engine::strategy::Decide;
///
/// struct CallingStation;
///
/// impl Decide for CallingStation {
///     fn decide(&self, snapshot: &GameSnapshot, seat: usize) -> Action {
///         if snapshot.call_amount(seat) == 0 {
///             Action::check(seat)
///         } else {
///             Action::call(seat)
///         }
///     }
/// }
/// ```
pub trait Decide {
    fn decide(&self, snapshot: &GameSnapshot, seat: usize) -> Action;

    fn name(&self) -> &str {
        "ai"
    }
}

impl<F> Decide for F
where
    F: Fn(&GameSnapshot, usize) -> Action,
{
    fn decide(&self, snapshot: &GameSnapshot, seat: usize) -> Action {
        self(snapshot, seat)
    }
}
