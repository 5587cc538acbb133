/*!

`InputUnit` (spec.md §4.2): one per input port, owns one `VirtualChannel`
per VC, sinks a `NetworkLink`, sources a `CreditLink` upstream.

*/

use crate::event::Time;
use crate::flit::{Flit,FlitType,Direction};
use crate::link::{NetworkLink,CreditLink};
use crate::quantify::Quantifiable;
use crate::vc::{VirtualChannel,VcState};

pub struct InputUnit
{
	pub direction: Direction,
	vcs: Vec<VirtualChannel>,
	/// Per-VC outport latch set by `RoutingUnit::outport_compute`; cleared when the VC
	/// allocation closes (spec.md §3).
	outport_latch: Vec<Option<(usize,Direction)>>,
	/// The downstream VC this input VC was bound to at HEAD-grant time (spec.md §4.5:
	/// "the allocation is held until a TAIL flit traverses"). `None` while idle/VC_AB.
	output_vc_binding: Vec<Option<usize>>,
	pub network_link: NetworkLink,
	pub credit_link: CreditLink,
}

impl InputUnit
{
	pub fn new(direction:Direction, num_vcs:usize, buffer_for: impl Fn(usize) -> usize, network_link:NetworkLink, credit_link:CreditLink) -> InputUnit
	{
		InputUnit{
			direction,
			vcs: (0..num_vcs).map(|vc| VirtualChannel::new(buffer_for(vc))).collect(),
			outport_latch: vec![None; num_vcs],
			output_vc_binding: vec![None; num_vcs],
			network_link,
			credit_link,
		}
	}

	pub fn output_vc_binding(&self, vc:usize) -> Option<usize> { self.output_vc_binding[vc] }
	pub fn set_output_vc_binding(&mut self, vc:usize, output_vc:usize) { self.output_vc_binding[vc] = Some(output_vc); }

	pub fn num_vcs(&self) -> usize { self.vcs.len() }
	pub fn vc(&self, vc:usize) -> &VirtualChannel { &self.vcs[vc] }
	pub fn vc_mut(&mut self, vc:usize) -> &mut VirtualChannel { &mut self.vcs[vc] }
	pub fn vc_is_empty(&self, vc:usize) -> bool { self.vcs[vc].is_empty() }
	pub fn peek_top_flit(&self, vc:usize) -> Option<&Flit> { self.vcs[vc].peek() }
	pub fn outport_of(&self, vc:usize) -> Option<(usize,Direction)> { self.outport_latch[vc] }
	pub fn set_outport_of(&mut self, vc:usize, outport:(usize,Direction)) { self.outport_latch[vc] = Some(outport); }
	pub fn clear_outport_of(&mut self, vc:usize) { self.outport_latch[vc] = None; }

	/// Latches `vc`'s outport decision and stamps it onto the flit just pushed into that
	/// VC (spec.md §3 invariant: a flit's `outport_index` is set only after route_compute
	/// has run for it at the current router).
	pub fn record_route_decision(&mut self, vc:usize, outport_index:usize, outport_direction:Direction)
	{
		self.outport_latch[vc] = Some((outport_index, outport_direction));
		if let Some(flit) = self.vcs[vc].back_mut()
		{
			flit.set_route_decision(outport_index, outport_direction);
		}
	}

	/// For SwizzleSwap: inserts a flit directly into a VC's queue, bypassing the normal
	/// NetworkLink arrival path (spec.md §4.2).
	pub fn insert_flit(&mut self, vc:usize, flit:Flit)
	{
		self.vcs[vc].push(flit);
	}

	/// `get_top_flit`/`set_vc_active`/`set_vc_idle` combined accessor for SwizzleSwap's
	/// full-swap case, which needs to pop a flit and flip the vacated VC's state together.
	pub fn take_top_flit(&mut self, vc:usize) -> Option<Flit>
	{
		self.vcs[vc].pop()
	}

	pub fn set_vc_active(&mut self, vc:usize)
	{
		self.vcs[vc].set_state(VcState::Active);
	}

	pub fn set_vc_idle(&mut self, vc:usize)
	{
		self.vcs[vc].set_state(VcState::Idle);
		self.outport_latch[vc] = None;
		self.output_vc_binding[vc] = None;
	}

	/// `wakeup()` (spec.md §4.2): pops an arrived flit off the NetworkLink and enqueues it
	/// into its declared VC, opening the allocation on HEAD/HEAD_TAIL. Returns the popped
	/// flit so `Router::wakeup` can schedule `RoutingUnit::outport_compute` for it; `None`
	/// is the benign "nothing arrived this cycle" case (spec.md §7).
	pub fn wakeup(&mut self, cycle:Time) -> Option<Flit>
	{
		let flit = self.network_link.pop(cycle)?;
		let vc = &mut self.vcs[flit.vc];
		vc.push(flit);
		match flit.flit_type
		{
			FlitType::Head | FlitType::HeadTail => vc.set_state(VcState::VcAb),
			FlitType::Body | FlitType::Tail => {},
		}
		Some(flit)
	}

	/// Emits a credit upstream for a flit that just left this VC (spec.md §4.2: "credits
	/// are emitted when a flit LEAVES this VC, not when it arrives").
	pub fn emit_credit(&mut self, vc:usize, cycle:Time, scheduler:&mut dyn crate::event::TickScheduler)
	{
		let is_free = self.vcs[vc].is_empty();
		self.credit_link.send(crate::flit::Credit{vc,is_free}, cycle, scheduler);
	}
}

impl Quantifiable for InputUnit
{
	fn total_memory(&self) -> usize
	{
		std::mem::size_of::<Self>()
			+ self.vcs.total_memory()
			+ self.network_link.total_memory()
			+ self.credit_link.total_memory()
	}
	fn print_memory_breakdown(&self) { unimplemented!() }
	fn forecast_total_memory(&self) -> usize { self.total_memory() }
}

#[cfg(test)]
mod tests
{
	use super::*;
	use crate::event::TickQueue;
	use crate::flit::RouteInfo;

	fn unit() -> InputUnit
	{
		InputUnit::new(Direction::North, 2, |_|4, NetworkLink::new(0), CreditLink::new(0))
	}

	fn sample_flit(vc:usize, flit_type:FlitType) -> Flit
	{
		let route = RouteInfo{src_ni:0,dst_ni:3,dst_router:3,hops:0};
		Flit::new(0,0,vc,route,flit_type,0)
	}

	#[test]
	fn wakeup_is_benign_when_nothing_arrived()
	{
		let mut unit = unit();
		assert!(unit.wakeup(0).is_none());
	}

	#[test]
	fn head_flit_opens_vc_allocation_busy()
	{
		let mut scheduler = TickQueue::new(4);
		let mut unit = unit();
		unit.network_link.send(sample_flit(0, FlitType::Head), 0, &mut scheduler);
		let got = unit.wakeup(1).expect("flit should be ready");
		assert_eq!(got.vc, 0);
		assert_eq!(unit.vc(0).state(), VcState::VcAb);
		assert_eq!(unit.vc(0).len(), 1);
	}

	#[test]
	fn emit_credit_reports_free_once_vc_drains()
	{
		let mut scheduler = TickQueue::new(4);
		let mut unit = unit();
		unit.insert_flit(1, sample_flit(1, FlitType::HeadTail));
		unit.take_top_flit(1);
		unit.emit_credit(1, 0, &mut scheduler);
		assert_eq!(unit.credit_link.pop(1), Some(crate::flit::Credit{vc:1,is_free:true}));
	}
}
