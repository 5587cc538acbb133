/*!

`OutputUnit` (spec.md §4.3): tracks per-VC downstream state, sources a
`NetworkLink`, sinks a `CreditLink` from downstream.

*/

use crate::event::Time;
use crate::flit::{Flit,Direction};
use crate::link::{NetworkLink,CreditLink};
use crate::quantify::Quantifiable;
use crate::vc::{OutputVcState,VcState};

pub struct OutputUnit
{
	pub direction: Direction,
	vcs: Vec<OutputVcState>,
	pub network_link: NetworkLink,
	pub credit_link: CreditLink,
}

impl OutputUnit
{
	pub fn new(direction:Direction, buffer_for: impl Fn(usize) -> usize, num_vcs:usize, network_link:NetworkLink, credit_link:CreditLink) -> OutputUnit
	{
		OutputUnit{
			direction,
			vcs: (0..num_vcs).map(|vc| OutputVcState::new(buffer_for(vc))).collect(),
			network_link,
			credit_link,
		}
	}

	pub fn num_vcs(&self) -> usize { self.vcs.len() }
	pub fn vc(&self, vc:usize) -> &OutputVcState { &self.vcs[vc] }
	pub fn has_credit(&self, vc:usize) -> bool { self.vcs[vc].has_credit() }
	pub fn is_vc_idle(&self, vc:usize) -> bool { self.vcs[vc].is_idle() }

	/// `select_free_vc(vnet)` (spec.md §4.3): the first idle, non-critical VC in range
	/// `[vnet_start, vnet_start+vnet_size)`. Never hands out the VC marked `is_critical`
	/// (spec.md §9 decision: never-grant, enforced here rather than only at the allocator,
	/// since `select_free_vc` is the single chokepoint every HEAD allocation passes through).
	pub fn select_free_vc(&self, vnet_start:usize, vnet_size:usize) -> Option<usize>
	{
		(vnet_start..vnet_start+vnet_size).find(|&vc| self.vcs[vc].is_idle() && !self.vcs[vc].is_critical)
	}

	pub fn set_vc_state(&mut self, vc:usize, state:VcState, cycle:Time)
	{
		self.vcs[vc].state = state;
		self.vcs[vc].last_change_cycle = cycle;
	}

	pub fn increment_credit(&mut self, vc:usize)
	{
		self.vcs[vc].credit_count += 1;
	}

	pub fn decrement_credit(&mut self, vc:usize)
	{
		self.vcs[vc].credit_count = self.vcs[vc].credit_count.saturating_sub(1);
	}

	pub fn set_vc_critical(&mut self, vc:usize, critical:bool)
	{
		self.vcs[vc].is_critical = critical;
	}

	pub fn set_owner(&mut self, vc:usize, input_port:usize, input_vc:usize)
	{
		self.vcs[vc].owner_input_port = Some(input_port);
		self.vcs[vc].owner_input_vc = Some(input_vc);
	}

	pub fn clear_owner(&mut self, vc:usize)
	{
		self.vcs[vc].owner_input_port = None;
		self.vcs[vc].owner_input_vc = None;
	}

	/// `wakeup()` (spec.md §4.3): drains any arrived credit, setting the VC idle on
	/// `is_free` and always incrementing `credit_count`.
	pub fn wakeup(&mut self, cycle:Time)
	{
		if let Some(credit) = self.credit_link.pop(cycle)
		{
			self.increment_credit(credit.vc);
			if credit.is_free
			{
				self.set_vc_state(credit.vc, VcState::Idle, cycle);
			}
		}
	}

	/// Sends a flit out on this port's `NetworkLink`, in the order the `CrossbarSwitch`
	/// writes winners (spec.md §4.3, §4.6).
	pub fn send_flit(&mut self, flit:Flit, cycle:Time, scheduler:&mut dyn crate::event::TickScheduler)
	{
		self.network_link.send(flit, cycle, scheduler);
	}
}

impl Quantifiable for OutputUnit
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

	fn unit() -> OutputUnit
	{
		OutputUnit::new(Direction::East, |_|4, 2, NetworkLink::new(0), CreditLink::new(0))
	}

	#[test]
	fn select_free_vc_skips_critical()
	{
		let mut unit = unit();
		unit.set_vc_critical(0, true);
		assert_eq!(unit.select_free_vc(0, 2), Some(1));
	}

	#[test]
	fn wakeup_drains_a_free_credit_and_idles_the_vc()
	{
		let mut scheduler = crate::event::TickQueue::new(4);
		let mut unit = unit();
		unit.set_vc_state(0, VcState::Active, 0);
		unit.credit_link.send(crate::flit::Credit{vc:0,is_free:true}, 0, &mut scheduler);
		unit.wakeup(1);
		assert!(unit.is_vc_idle(0));
		assert_eq!(unit.vc(0).credit_count, 5);
	}

	#[test]
	fn wakeup_without_is_free_only_increments_credit()
	{
		let mut scheduler = crate::event::TickQueue::new(4);
		let mut unit = unit();
		unit.set_vc_state(0, VcState::Active, 0);
		unit.credit_link.send(crate::flit::Credit{vc:0,is_free:false}, 0, &mut scheduler);
		unit.wakeup(1);
		assert!(!unit.is_vc_idle(0));
		assert_eq!(unit.vc(0).credit_count, 5);
	}
}
