/*!

The atomic transport unit (spec.md §3, §4.1) and the `Direction` enum shared
by routing, the router pipeline and the built-in `network` harness.

*/

use quantifiable_derive::Quantifiable;//the derive macro
use crate::event::Time;
use crate::quantify::Quantifiable;

/// A router-local port direction. Closed per spec.md §9's design note: "model as a
/// closed enumeration of variants", replacing `caminos-lib`'s string-keyed directions.
#[derive(Debug,Clone,Copy,PartialEq,Eq,Hash)]
pub enum Direction
{
	North,
	East,
	South,
	West,
	/// The port facing the local network interface. Never a SwizzleSwap/deflection candidate.
	Local,
}

impl Direction
{
	/// The canonical mirror used by `input_output_dirn_map` (spec.md §4.4) and by SwizzleSwap
	/// to find the upstream OutputUnit feeding a given downstream inport.
	pub fn mirror(self) -> Direction
	{
		match self
		{
			Direction::North => Direction::South,
			Direction::South => Direction::North,
			Direction::East => Direction::West,
			Direction::West => Direction::East,
			Direction::Local => Direction::Local,
		}
	}

	pub fn is_local(self) -> bool
	{
		matches!(self, Direction::Local)
	}

	/// The four non-`Local` directions, in a fixed canonical order used wherever ports are
	/// enumerated (`RoutingUnit`'s direction<->index maps, `Router::wakeup`'s per-port loops).
	pub fn non_local() -> [Direction; 4]
	{
		[Direction::North, Direction::East, Direction::South, Direction::West]
	}
}

/// Fieldless enum; `size_of` is the whole story.
impl Quantifiable for Direction
{
	fn total_memory(&self) -> usize { std::mem::size_of::<Self>() }
	fn print_memory_breakdown(&self) {}
	fn forecast_total_memory(&self) -> usize { std::mem::size_of::<Self>() }
}

/// Flit type, carried so `InputUnit`/`OutputUnit` can tell VC-allocation boundaries apart
/// (spec.md §3: a VC allocation persists from HEAD through TAIL).
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum FlitType
{
	Head,
	Body,
	Tail,
	/// A single-flit packet: both allocates and releases the VC in the same cycle.
	HeadTail,
}

impl FlitType
{
	/// Whether this flit type opens a new VC allocation (HEAD or HEAD_TAIL).
	pub fn opens_vc(self) -> bool
	{
		matches!(self, FlitType::Head | FlitType::HeadTail)
	}

	/// Whether this flit type releases the VC allocation once it departs (TAIL or HEAD_TAIL).
	pub fn closes_vc(self) -> bool
	{
		matches!(self, FlitType::Tail | FlitType::HeadTail)
	}
}

impl Quantifiable for FlitType
{
	fn total_memory(&self) -> usize { std::mem::size_of::<Self>() }
	fn print_memory_breakdown(&self) {}
	fn forecast_total_memory(&self) -> usize { std::mem::size_of::<Self>() }
}

/// A flit's end-to-end route descriptor (spec.md §3).
#[derive(Debug,Clone,Copy,PartialEq,Eq,Quantifiable)]
pub struct RouteInfo
{
	pub src_ni: usize,
	pub dst_ni: usize,
	pub dst_router: usize,
	/// Number of routers traversed so far, including the current one. Used for latency
	/// accounting and for `estimated_remaining_hops`-style adaptive routing decisions.
	pub hops: usize,
}

/// The atomic transport unit (spec.md §3).
///
/// `outport_index`/`outport_direction` are set only after `RoutingUnit::outport_compute`
/// has run for this flit at its current router (spec.md §3 invariant); they start `None`.
#[derive(Debug,Clone,Copy,PartialEq,Eq,Quantifiable)]
pub struct Flit
{
	pub id: u64,
	pub vnet: usize,
	pub vc: usize,
	pub route: RouteInfo,
	pub flit_type: FlitType,
	pub outport_index: Option<usize>,
	pub outport_direction: Option<Direction>,
	/// Cycle this flit was written into its current VC.
	pub enqueue_time: Time,
	/// Cycle this flit was injected at its source NI; never changes after injection.
	pub network_entry_time: Time,
	/// Sampled-flit statistics flag (spec.md §3, `GarnetNetwork::check_marked_flits`).
	pub marked: bool,
}

impl Flit
{
	pub fn new(id:u64, vnet:usize, vc:usize, route:RouteInfo, flit_type:FlitType, network_entry_time:Time) -> Flit
	{
		Flit{
			id, vnet, vc, route, flit_type,
			outport_index: None,
			outport_direction: None,
			enqueue_time: network_entry_time,
			network_entry_time,
			marked: false,
		}
	}

	/// Clears the outport decision, forcing the next router to re-run `outport_compute`.
	/// Used after a SwizzleSwap/bubble-deflection move changes the flit's inport (spec.md §4.8).
	pub fn clear_route_decision(&mut self)
	{
		self.outport_index = None;
		self.outport_direction = None;
	}

	pub fn set_route_decision(&mut self, outport_index:usize, outport_direction:Direction)
	{
		self.outport_index = Some(outport_index);
		self.outport_direction = Some(outport_direction);
	}

	pub fn has_route_decision(&self) -> bool
	{
		self.outport_index.is_some()
	}
}

/// A small message carrying a VC id and an is-free bit, sent upstream to replenish
/// buffer slots (spec.md §3).
#[derive(Debug,Clone,Copy,PartialEq,Eq,Quantifiable)]
pub struct Credit
{
	pub vc: usize,
	pub is_free: bool,
}

#[cfg(test)]
mod tests
{
	use super::*;

	#[test]
	fn mirror_is_an_involution_on_cardinal_directions()
	{
		for d in Direction::non_local()
		{
			assert_eq!(d.mirror().mirror(), d);
			assert_ne!(d.mirror(), d);
		}
		assert_eq!(Direction::Local.mirror(), Direction::Local);
	}

	#[test]
	fn head_tail_opens_and_closes_the_vc()
	{
		assert!(FlitType::HeadTail.opens_vc());
		assert!(FlitType::HeadTail.closes_vc());
		assert!(FlitType::Head.opens_vc());
		assert!(!FlitType::Head.closes_vc());
		assert!(!FlitType::Body.opens_vc());
		assert!(!FlitType::Body.closes_vc());
		assert!(FlitType::Tail.closes_vc());
	}

	#[test]
	fn new_flit_has_no_route_decision_yet()
	{
		let route = RouteInfo{src_ni:0, dst_ni:3, dst_router:3, hops:0};
		let flit = Flit::new(0, 0, 0, route, FlitType::HeadTail, 10);
		assert!(!flit.has_route_decision());
	}
}
