/*!

One-cycle delay lines (spec.md §4.1). `NetworkLink` carries `Flit`s from an
`OutputUnit` to the downstream `InputUnit`; `CreditLink` carries `Credit`s the
other way. Both are the same shape, parameterized over payload type, grounded
on `caminos-lib`'s link/phit-to-location delay-line pattern (`event.rs`'s
`Event::PhitToLocation`) but simplified to the fixed one-cycle delay spec.md
names: "a one-cycle delay line holding at most one flit".

*/

use crate::event::{Time,RouterId,TickScheduler};
use crate::quantify::Quantifiable;

/// A one-cycle delay line holding at most one item, with a source-side write queue and a
/// consumer that gets scheduled a wakeup for the cycle the item becomes visible.
#[derive(Debug,Clone)]
pub struct DelayLine<T>
{
	/// The consumer to wake up once `in_flight` becomes ready. `None` until a harness wires it.
	consumer: Option<RouterId>,
	/// Cycle at which `in_flight` becomes visible to the consumer, if any item is in flight.
	ready_at: Option<Time>,
	in_flight: Option<T>,
}

impl<T> Default for DelayLine<T>
{
	fn default() -> Self
	{
		DelayLine{ consumer: None, ready_at: None, in_flight: None }
	}
}

impl<T> DelayLine<T>
{
	pub fn new(consumer:RouterId) -> DelayLine<T>
	{
		DelayLine{ consumer: Some(consumer), ready_at: None, in_flight: None }
	}

	/// Whether the line is free to accept a new item this cycle. A link holds at most one
	/// item (spec.md §4.1), so the source unit must check this before `send`.
	pub fn is_free(&self) -> bool
	{
		self.in_flight.is_none()
	}

	/// Writes `item` onto the line and, if wired to a consumer, schedules its wakeup for
	/// `current_cycle + 1`.
	pub fn send(&mut self, item:T, cycle:Time, scheduler:&mut dyn TickScheduler)
	{
		self.in_flight = Some(item);
		self.ready_at = Some(cycle + 1);
		if let Some(consumer) = self.consumer
		{
			scheduler.schedule_wakeup(consumer, cycle + 1);
		}
	}

	/// `isReady(cycle)` (spec.md §4.1): true iff an item arrived in a cycle `<= cycle`.
	pub fn is_ready(&self, cycle:Time) -> bool
	{
		matches!(self.ready_at, Some(at) if at <= cycle)
	}

	/// Pops the in-flight item if ready, freeing the line. Returns `None` on a spurious
	/// wakeup (benign; spec.md §7 "Benign contention").
	pub fn pop(&mut self, cycle:Time) -> Option<T>
	{
		if self.is_ready(cycle)
		{
			self.ready_at = None;
			self.in_flight.take()
		}
		else
		{
			None
		}
	}

	/// Relocates whatever is in flight on `self` onto `other`, preserving its ready cycle,
	/// without scheduling a fresh wakeup (the original `send` already scheduled the right
	/// one). An `OutputUnit`'s `network_link` and the downstream `InputUnit`'s `network_link`
	/// are two separately-owned `DelayLine`s sitting on either side of one wire (spec.md
	/// §4.1); this is the harness's once-per-cycle step that actually crosses the wire.
	pub fn relay_into(&mut self, other:&mut DelayLine<T>)
	{
		if let Some(item) = self.in_flight.take()
		{
			other.in_flight = Some(item);
			other.ready_at = self.ready_at.take();
		}
	}
}

impl<T:Quantifiable> Quantifiable for DelayLine<T>
{
	fn total_memory(&self) -> usize
	{
		std::mem::size_of::<Self>() + self.in_flight.as_ref().map_or(0,|item| item.total_memory())
	}
	fn print_memory_breakdown(&self) { unimplemented!() }
	fn forecast_total_memory(&self) -> usize { self.total_memory() }
}

/// `NetworkLink`: carries flits from an `OutputUnit` to the downstream `InputUnit`.
pub type NetworkLink = DelayLine<crate::flit::Flit>;

/// `CreditLink`: carries credits from an `InputUnit` back to the upstream `OutputUnit`.
pub type CreditLink = DelayLine<crate::flit::Credit>;

#[cfg(test)]
mod tests
{
	use super::*;
	use crate::event::TickQueue;
	use crate::flit::{Flit,FlitType,RouteInfo,Credit};

	fn sample_flit() -> Flit
	{
		let route = RouteInfo{src_ni:0,dst_ni:1,dst_router:1,hops:0};
		Flit::new(0,0,0,route,FlitType::HeadTail,0)
	}

	#[test]
	fn item_is_not_ready_the_cycle_it_is_sent()
	{
		let mut scheduler = TickQueue::new(4);
		let mut link: NetworkLink = DelayLine::new(7);
		assert!(link.is_free());
		link.send(sample_flit(), 0, &mut scheduler);
		assert!(!link.is_free());
		assert!(!link.is_ready(0));
		assert!(link.is_ready(1));
	}

	#[test]
	fn pop_frees_the_line_and_wakes_the_consumer()
	{
		let mut scheduler = TickQueue::new(4);
		let mut link: NetworkLink = DelayLine::new(3);
		link.send(sample_flit(), 0, &mut scheduler);
		assert_eq!(scheduler.advance(), vec![3]);
		assert!(link.pop(1).is_some());
		assert!(link.is_free());
		assert!(link.pop(1).is_none());
	}

	#[test]
	fn credit_link_carries_credits()
	{
		let mut scheduler = TickQueue::new(4);
		let mut link: CreditLink = DelayLine::new(0);
		link.send(Credit{vc:2,is_free:true}, 5, &mut scheduler);
		assert_eq!(link.pop(6), Some(Credit{vc:2,is_free:true}));
	}
}
