/*!

`Buffer`/`VirtualChannel` (spec.md §3): a bounded ordered queue of flits for a
single VC, plus allocation state and the `is_critical` bit SwizzleSwap uses
to mark the one VC per `OutputUnit` that must never be granted.

*/

use std::collections::VecDeque;
use std::mem::size_of;
use quantifiable_derive::Quantifiable;//the derive macro
use crate::flit::Flit;
use crate::quantify::Quantifiable;

/// VC allocation state (spec.md §3).
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum VcState
{
	Idle,
	/// VC allocation busy: a HEAD/HEAD_TAIL flit has arrived but the downstream VC it will
	/// be bound to has not been chosen yet.
	VcAb,
	/// The VC holds a live allocation to a specific downstream VC.
	Active,
}

impl Quantifiable for VcState
{
	fn total_memory(&self) -> usize { size_of::<Self>() }
	fn print_memory_breakdown(&self) {}
	fn forecast_total_memory(&self) -> usize { size_of::<Self>() }
}

/// A bounded FIFO of flits for one virtual channel, with its allocation state and
/// criticality bit.
#[derive(Debug,Clone)]
pub struct VirtualChannel
{
	capacity: usize,
	queue: VecDeque<Flit>,
	state: VcState,
	/// True iff this is the one VC per `OutputUnit` that SwizzleSwap is keeping empty/held
	/// as the critical inport's upstream mirror (spec.md §3, §4.8). At most one per OutputUnit.
	is_critical: bool,
}

impl VirtualChannel
{
	pub fn new(capacity:usize) -> VirtualChannel
	{
		VirtualChannel{ capacity, queue: VecDeque::new(), state: VcState::Idle, is_critical: false }
	}

	pub fn capacity(&self) -> usize { self.capacity }
	pub fn len(&self) -> usize { self.queue.len() }
	pub fn is_empty(&self) -> bool { self.queue.is_empty() }
	pub fn is_full(&self) -> bool { self.queue.len() >= self.capacity }
	pub fn state(&self) -> VcState { self.state }
	pub fn is_critical(&self) -> bool { self.is_critical }

	pub fn set_state(&mut self, state:VcState)
	{
		self.state = state;
	}

	pub fn set_critical(&mut self, critical:bool)
	{
		self.is_critical = critical;
	}

	/// Enqueues a flit, unconditionally. Callers are expected to have checked `is_full`.
	pub fn push(&mut self, flit:Flit)
	{
		self.queue.push_back(flit);
	}

	/// The flit most recently `push`ed, if any. Used to stamp a route decision onto a flit
	/// just after it was enqueued (spec.md §4.2's `InputUnit::wakeup` + `Router`'s
	/// immediately-following `outport_compute`).
	pub fn back_mut(&mut self) -> Option<&mut Flit>
	{
		self.queue.back_mut()
	}

	pub fn peek(&self) -> Option<&Flit>
	{
		self.queue.front()
	}

	pub fn pop(&mut self) -> Option<Flit>
	{
		self.queue.pop_front()
	}
}

impl Quantifiable for VirtualChannel
{
	fn total_memory(&self) -> usize
	{
		size_of::<Self>() + self.queue.iter().map(|flit| flit.total_memory()).sum::<usize>()
	}
	fn print_memory_breakdown(&self) { unimplemented!() }
	fn forecast_total_memory(&self) -> usize { size_of::<Self>() + self.capacity * size_of::<Flit>() }
}

/// Per-VC state an `OutputUnit` keeps about the downstream side it drives (spec.md §4.3).
#[derive(Debug,Clone,Quantifiable)]
pub struct OutputVcState
{
	pub state: VcState,
	/// Free downstream slots visible to this OutputUnit (spec.md §3 invariant (a)).
	pub credit_count: usize,
	pub is_critical: bool,
	pub owner_input_port: Option<usize>,
	pub owner_input_vc: Option<usize>,
	pub last_change_cycle: crate::event::Time,
}

impl OutputVcState
{
	pub fn new(initial_credits:usize) -> OutputVcState
	{
		OutputVcState{
			state: VcState::Idle,
			credit_count: initial_credits,
			is_critical: false,
			owner_input_port: None,
			owner_input_vc: None,
			last_change_cycle: 0,
		}
	}

	pub fn has_credit(&self) -> bool
	{
		self.credit_count > 0
	}

	pub fn is_idle(&self) -> bool
	{
		self.state == VcState::Idle
	}
}
