/*!

`CrossbarSwitch` (spec.md §4.6): per-cycle datapath that moves winning flits
from their chosen input VC to the chosen output port. No further arbitration;
winners are recorded by `SwitchAllocator` via `update_sw_winner` earlier in
the same cycle and drained to the `OutputUnit`s' `NetworkLink`s here.

*/

use crate::event::Time;
use crate::flit::Flit;
use crate::quantify::Quantifiable;
use super::output_unit::OutputUnit;

pub struct CrossbarSwitch
{
	winners: Vec<(usize, Flit)>,
	/// Running count of flits moved, for the harness's activity statistics.
	pub activity: u64,
}

impl CrossbarSwitch
{
	pub fn new() -> CrossbarSwitch
	{
		CrossbarSwitch{ winners: Vec::new(), activity: 0 }
	}

	/// Records a `SwitchAllocator` winner for this cycle: `flit` is to be moved onto
	/// `output_port`'s `NetworkLink`.
	pub fn update_sw_winner(&mut self, output_port:usize, flit:Flit)
	{
		self.winners.push((output_port, flit));
	}

	/// `wakeup()`: drains this cycle's recorded winners onto their output ports'
	/// `NetworkLink`s, in the order they were recorded.
	pub fn wakeup(&mut self, outputs:&mut [OutputUnit], cycle:Time, scheduler:&mut dyn crate::event::TickScheduler)
	{
		for (output_port, flit) in self.winners.drain(..)
		{
			outputs[output_port].send_flit(flit, cycle, scheduler);
			self.activity += 1;
		}
	}
}

impl Default for CrossbarSwitch
{
	fn default() -> Self { CrossbarSwitch::new() }
}

impl Quantifiable for CrossbarSwitch
{
	fn total_memory(&self) -> usize
	{
		std::mem::size_of::<Self>() + self.winners.iter().map(|(_,flit)| flit.total_memory()).sum::<usize>()
	}
	fn print_memory_breakdown(&self) { unimplemented!() }
	fn forecast_total_memory(&self) -> usize { self.total_memory() }
}

#[cfg(test)]
mod tests
{
	use super::*;
	use crate::event::TickQueue;
	use crate::flit::{FlitType,RouteInfo,Direction};
	use crate::link::{NetworkLink,CreditLink};

	#[test]
	fn wakeup_drains_all_recorded_winners_and_counts_activity()
	{
		let mut scheduler = TickQueue::new(4);
		let mut crossbar = CrossbarSwitch::new();
		let mut outputs = vec![OutputUnit::new(Direction::East, |_|4, 1, NetworkLink::new(0), CreditLink::new(0))];
		let route = RouteInfo{src_ni:0,dst_ni:1,dst_router:1,hops:0};
		crossbar.update_sw_winner(0, Flit::new(0,0,0,route,FlitType::HeadTail,0));
		crossbar.wakeup(&mut outputs, 0, &mut scheduler);
		assert_eq!(crossbar.activity, 1);
		assert!(!outputs[0].network_link.is_free());
	}
}
