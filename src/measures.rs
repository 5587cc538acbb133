/*!

Module encapsulating the statistics this crate tracks about a running
simulation. The main measures are documented as fields of `RouterStats` and
`NetworkStats`, in the style of `caminos-lib`'s `measures.rs`, which
documents its `StatisticMeasurement` fields the same way.

The per-router measures are:
* `flits_received`/`flits_sent` count crossbar activity (§4.6).
* `num_bubble_swizzles` counts SwizzleSwap criticality migrations (§4.8 case 1 and case 2).
* `num_bubble_swaps` counts every Critical-Bubble Deflection exchange (§4.8 step 3).
* `num_routed_bubble_swaps` counts the subset of those that found a mutual-routing match.

The network-wide measures are:
* `cycle` is the last simulated cycle.
* `injected_flits`/`ejected_flits` track the no-flit-lost invariant (§8).
* `total_latency`/`sampled_packets` feed `average_packet_latency`.
* All of the above are suppressed until `warmup_cycles` has elapsed
  (`GarnetNetwork`'s `statistics_begin_cycle` pattern, §A.5).

*/

use quantifiable_derive::Quantifiable;//the derive macro
use crate::event::Time;
use crate::quantify::Quantifiable;

/// Per-router counters (spec.md §8's "Round-trip / laws").
#[derive(Debug,Clone,Default,Quantifiable)]
pub struct RouterStats
{
	pub flits_received: u64,
	pub flits_sent: u64,
	/// SwizzleSwap criticality migrations, cases 1 and 2 combined (§4.8).
	pub num_bubble_swizzles: u64,
	/// Every Critical-Bubble Deflection exchange, mutual or not (§4.8 step 3).
	pub num_bubble_swaps: u64,
	/// The subset of `num_bubble_swaps` that found a mutual-routing match.
	pub num_routed_bubble_swaps: u64,
	/// Bounded-retry exhaustions of `swap_inport` (§7: "not an error", just counted).
	pub swap_retries_exhausted: u64,
}

impl RouterStats
{
	/// `num_bubbleSwizzles` + `num_bubbleSwaps` only ever increase (spec.md §8 round-trip
	/// law); this is exercised by `tests/` rather than enforced here, since enforcing a
	/// monotonic invariant inside the counter's own setter would just move the bug.
	pub fn record_swizzle_migration(&mut self)
	{
		self.num_bubble_swizzles += 1;
	}

	pub fn record_bubble_swap(&mut self, mutual:bool)
	{
		self.num_bubble_swaps += 1;
		if mutual
		{
			self.num_routed_bubble_swaps += 1;
		}
	}
}

/// Network-wide counters kept by the built-in harness (`network.rs`).
#[derive(Debug,Clone,Quantifiable)]
pub struct NetworkStats
{
	pub warmup_cycles: Time,
	pub injected_flits: u64,
	pub ejected_flits: u64,
	pub total_latency: u64,
	pub sampled_packets: u64,
}

impl NetworkStats
{
	pub fn new(warmup_cycles:Time) -> NetworkStats
	{
		NetworkStats{ warmup_cycles, injected_flits:0, ejected_flits:0, total_latency:0, sampled_packets:0 }
	}

	fn past_warmup(&self, cycle:Time) -> bool
	{
		cycle >= self.warmup_cycles
	}

	pub fn record_injection(&mut self, cycle:Time)
	{
		if self.past_warmup(cycle)
		{
			self.injected_flits += 1;
		}
	}

	pub fn record_ejection(&mut self, cycle:Time, network_entry_time:Time)
	{
		if self.past_warmup(cycle)
		{
			self.ejected_flits += 1;
			self.total_latency += cycle.saturating_sub(network_entry_time);
			self.sampled_packets += 1;
		}
	}

	pub fn average_packet_latency(&self) -> f64
	{
		if self.sampled_packets == 0
		{
			0.0
		}
		else
		{
			self.total_latency as f64 / self.sampled_packets as f64
		}
	}
}
