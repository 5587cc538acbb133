/*!

The cycle clock and tick scheduler (spec.md §5, §6).

`caminos-lib` drives a fully general discrete-event simulation: any
`Eventful` can be scheduled at an arbitrary future cycle and is invoked
through `Rc<RefCell<dyn Eventful>>`, with a circular buffer of event
vectors (`EventQueue::event_begin_circle`/`event_end_circle`) indexed by
cycle offset. The router core in this crate does not need that generality:
spec.md §5 fixes a single-threaded, fixed stage order within every cycle
(`Router` -> `InputUnit` -> `OutputUnit` -> `SwitchAllocator` ->
`CrossbarSwitch`), and the only genuine multi-cycle delays are the
one-cycle `NetworkLink`/`CreditLink` wires. `TickQueue` keeps the
circular-buffer-by-offset technique but schedules plain `RouterId`
wake-ups instead of boxed trait objects.

*/

use quantifiable_derive::Quantifiable;//the derive macro
use crate::quantify::Quantifiable;

/// Discrete cycle count. Never wraps in practice; `u64` matches `caminos-lib`'s own `Time`.
pub type Time = u64;

/// Identifies the router to wake up on a given cycle. Indexes `Network`'s router vector.
pub type RouterId = usize;

/// A tick scheduler: lets a link hand a wake-up to some future cycle, and lets the
/// harness ask what cycle it is currently driving. Spec.md §6's external interface.
pub trait TickScheduler
{
	fn schedule_wakeup(&mut self, consumer:RouterId, cycle:Time);
	fn current_cycle(&self) -> Time;
}

/// Circular-buffer tick scheduler, grounded on `caminos-lib`'s `EventQueue`.
///
/// `horizon` bounds how far into the future a wake-up can be scheduled; this crate
/// only ever schedules one cycle ahead (`NetworkLink`/`CreditLink` delay), so the
/// default horizon of 2 is enough, but a larger value is accepted for harnesses that
/// want to coalesce further-out wake-ups (e.g. TDM-gated swaps, spec.md §6 `tdm`).
#[derive(Debug,Clone,Quantifiable)]
pub struct TickQueue
{
	/// `pending[(current + offset) % pending.len()]` holds the consumers due at
	/// `current_cycle() + offset`.
	pending: Vec<Vec<RouterId>>,
	current: usize,
	cycle: Time,
}

impl TickQueue
{
	pub fn new(horizon:usize) -> TickQueue
	{
		let horizon = horizon.max(2);
		TickQueue{
			pending: vec![Vec::new(); horizon],
			current: 0,
			cycle: 0,
		}
	}

	/// Advances the clock by one cycle and returns the consumers due *now*, after the
	/// advance. Draining the slot before reuse is what makes the buffer circular.
	pub fn advance(&mut self) -> Vec<RouterId>
	{
		self.cycle += 1;
		self.current = (self.current + 1) % self.pending.len();
		std::mem::take(&mut self.pending[self.current])
	}
}

impl TickScheduler for TickQueue
{
	fn schedule_wakeup(&mut self, consumer:RouterId, cycle:Time)
	{
		let delay = cycle.saturating_sub(self.cycle) as usize;
		if delay == 0
		{
			// Waking up "now" or in the past both mean "as soon as possible": the
			// current slot has already been drained this cycle, so the earliest
			// honest slot is the next one.
			let slot = (self.current + 1) % self.pending.len();
			self.pending[slot].push(consumer);
			return;
		}
		let slot = (self.current + delay) % self.pending.len();
		self.pending[slot].push(consumer);
	}

	fn current_cycle(&self) -> Time
	{
		self.cycle
	}
}
