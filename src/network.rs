/*!

`Network` (spec.md §4.9): the built-in harness that owns a 2D mesh/torus of
`Router`s, wires their `NetworkLink`/`CreditLink`s to each other, drives
injection/ejection at the network interfaces, and sequences the combined
per-cycle pipeline (spec.md §4.7 baseline interleaved with §4.8's SwizzleSwap
extension) across every router.

Grounded on `caminos-lib`'s `Network`/`CartesianTransform`-backed mesh
topology construction (`topology/mesh.rs`,
`topology/cartesian_transform.rs`), simplified to the closed-form 2D
mesh/torus this crate's scope calls for (SPEC_FULL.md §1).

*/

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::config::{NetworkConfig,RoutingAlgorithm};
use crate::error::Error;
use crate::event::{Time,TickQueue};
use crate::flit::{Direction,Flit,FlitType,RouteInfo};
use crate::measures::NetworkStats;
use crate::quantify::{self,Quantifiable};
use crate::router::routing_unit::{RoutingUnit,direction_to_port,port_to_direction};
use crate::router::{self,Router};

/// `StdRng` is foreign; its heap-allocated state is opaque from outside `rand`, so this is
/// the same `size_of`-only approximation `quantify.rs`'s doc comment describes for "the few
/// generic containers that need it by hand".
impl Quantifiable for StdRng
{
	fn total_memory(&self) -> usize { std::mem::size_of::<Self>() }
	fn print_memory_breakdown(&self) {}
	fn forecast_total_memory(&self) -> usize { std::mem::size_of::<Self>() }
}

/// A 2D mesh or torus of routers, one network interface per router (spec.md §4.9: "one NI
/// per router, in this crate's scope").
pub struct Network
{
	pub config: NetworkConfig,
	routers: Vec<Router>,
	scheduler: TickQueue,
	rng: StdRng,
	pub stats: NetworkStats,
	next_flit_id: u64,
}

/// gem5 Garnet2.0's `get_RouterInDirn` (`GarnetNetwork.cc`): the id of `my_id`'s neighbor
/// in `direction`. North increases the row index, wrapping the last row back to row 0;
/// South decreases it, wrapping row 0 back to the last row. East/West are the mirror image
/// on columns. Callers must not invoke this for `Direction::Local`.
pub fn get_router_in_dirn(direction:Direction, my_id:usize, num_cols:usize, num_rows:usize) -> usize
{
	match direction
	{
		Direction::East =>
		{
			if my_id % num_cols == num_cols - 1 { my_id + 1 - num_cols } else { my_id + 1 }
		},
		Direction::West =>
		{
			if my_id % num_cols == 0 { my_id + num_cols - 1 } else { my_id - 1 }
		},
		Direction::North =>
		{
			if my_id / num_cols == num_rows - 1 { my_id % num_cols } else { my_id + num_cols }
		},
		Direction::South =>
		{
			if my_id / num_cols == 0 { my_id + num_cols * (num_rows - 1) } else { my_id - num_cols }
		},
		Direction::Local => panic!("get_router_in_dirn is not defined for the Local port"),
	}
}

impl Network
{
	pub fn new(config:NetworkConfig, seed:u64) -> Result<Network, Error>
	{
		config.validate()?;
		let num_routers = config.num_cols * config.num_rows.unwrap_or(1);
		let routers: Vec<Router> = (0..num_routers).map(|id|
		{
			let routing = RoutingUnit::new(id, config.num_cols, config.num_rows, config.torus, config.router.routing_algorithm);
			Router::new(id, config.router.clone(), routing)
		}).collect();
		let mut network = Network{
			config: config.clone(),
			routers,
			scheduler: TickQueue::new(8),
			rng: StdRng::seed_from_u64(seed),
			stats: NetworkStats::new(config.warmup_cycles),
			next_flit_id: 0,
		};
		network.wire_links();
		if config.router.swizzle_swap
		{
			network.install_initial_critical_inports();
		}
		Ok(network)
	}

	pub fn router(&self, id:usize) -> &Router { &self.routers[id] }
	pub fn num_routers(&self) -> usize { self.routers.len() }

	fn neighbor_of(&self, my_id:usize, direction:Direction) -> usize
	{
		let num_rows = self.config.num_rows.expect("mesh/torus topology requires num_rows");
		get_router_in_dirn(direction, my_id, self.config.num_cols, num_rows)
	}

	/// Wires every router's `NetworkLink`/`CreditLink` consumer fields to the neighbor on
	/// the other side (spec.md §4.1). `Local` ports stay unwired here; the harness drives
	/// them directly via `inject`/`eject`.
	fn wire_links(&mut self)
	{
		for id in 0..self.routers.len()
		{
			for direction in Direction::non_local()
			{
				let neighbor_id = self.neighbor_of(id, direction);
				// This port's NetworkLink feeds the downstream neighbor's InputUnit.
				self.routers[id].output_mut(direction).network_link = crate::link::NetworkLink::new(neighbor_id);
				// Credits flow back upstream to the neighbor's OutputUnit on the mirrored port.
				self.routers[id].input_mut(direction).credit_link = crate::link::CreditLink::new(neighbor_id);
			}
		}
	}

	/// Installs a West-facing critical inport at every router as the initial SwizzleSwap
	/// state (spec.md §4.8: "any single choice is a valid starting state"), and marks the
	/// matching upstream mirror VC critical with one credit.
	fn install_initial_critical_inports(&mut self)
	{
		for id in 0..self.routers.len()
		{
			self.routers[id].set_initial_critical_inport(Direction::West);
		}
		for id in 0..self.routers.len()
		{
			let neighbor_id = self.neighbor_of(id, Direction::West);
			let mirror_port = direction_to_port(Direction::West.mirror());
			let output = self.routers[neighbor_id].output_mut(port_to_direction(mirror_port));
			output.set_vc_critical(0, true);
			while output.vc(0).credit_count > 1 { output.decrement_credit(0); }
			while output.vc(0).credit_count < 1 { output.increment_credit(0); }
		}
	}

	/// Injects a new packet at `src_router`'s Local input, as a single `HeadTail` flit
	/// (spec.md §4.9's NI path). Returns the flit id, or `None` if VC0 of the chosen vnet
	/// has no room (benign contention; the caller should retry next cycle).
	pub fn inject(&mut self, src_router:usize, dst_router:usize, dst_ni:usize, vnet:usize, cycle:Time) -> Option<u64>
	{
		let vc = vnet * self.config.router.vcs_per_vnet;
		if self.routers[src_router].input(Direction::Local).vc(vc).is_full()
		{
			return None;
		}
		let route = RouteInfo{ src_ni: src_router, dst_ni, dst_router, hops: 0 };
		let id = self.next_flit_id;
		self.next_flit_id += 1;
		let flit = Flit::new(id, vnet, vc, route, FlitType::HeadTail, cycle);
		self.routers[src_router].input_mut(Direction::Local).insert_flit(vc, flit);
		self.routers[src_router].input_mut(Direction::Local).set_vc_active(vc);
		// Bypasses `NetworkLink`/`input_phase`, so the route decision has to be latched here
		// or the SwitchAllocator would never nominate this VC (spec.md §4.4).
		self.routers[src_router].compute_and_latch_route(Direction::Local, vc).ok()?;
		self.stats.record_injection(cycle);
		Some(id)
	}

	/// Drains any flit the crossbar routed to a router's Local output this cycle (ejection,
	/// spec.md §4.9), returning it for statistics/consumption by the caller.
	pub fn eject(&mut self, router_id:usize, cycle:Time) -> Option<Flit>
	{
		let output = self.routers[router_id].output_mut(Direction::Local);
		let flit = output.network_link.pop(cycle)?;
		// The Local port's CreditLink is never wired to a consumer (`wire_links` only wires
		// non-Local directions): the NI is an immediate, always-available sink rather than
		// another delay line. A real downstream InputUnit draining a VC both frees a credit
		// and (on an empty queue) idles the VC (`OutputUnit::wakeup`); ejection has to do
		// both directly or the Local VC would stay permanently bound after its first use.
		output.increment_credit(flit.vc);
		output.set_vc_state(flit.vc, crate::vc::VcState::Idle, cycle);
		self.stats.record_ejection(cycle, flit.network_entry_time);
		Some(flit)
	}

	/// Runs the combined baseline + SwizzleSwap/deflection pipeline (spec.md §4.7 + §4.8)
	/// for one cycle, across every router. Step order: (1) invariant check, (2) every
	/// router's `wakeup_local` (`OutputUnit.wakeup` -> `SwitchAllocator.wakeup` ->
	/// `CrossbarSwitch.wakeup` -> `InputUnit.wakeup` + routing decision -> recompute
	/// occupancy; see `Router::wakeup_local`'s doc comment for why routing decision runs
	/// last), (3) `swap_inport`, (4) critical-bubble deflection. Steps 1/3/4 only run when
	/// `swizzle_swap` is configured.
	pub fn tick(&mut self, cycle:Time) -> Result<(), Error>
	{
		let num_cols = self.config.num_cols;
		let num_rows = self.config.num_rows.expect("mesh/torus topology requires num_rows");
		let neighbor_of = move |id:usize, direction:Direction| get_router_in_dirn(direction, id, num_cols, num_rows);

		if self.config.router.swizzle_swap
		{
			router::check_swizzle_invariants(&self.routers, &neighbor_of, cycle)?;
		}

		for id in 0..self.routers.len()
		{
			self.routers[id].wakeup_local(cycle, &mut self.scheduler)?;
		}

		// `wakeup_local` only writes onto each router's own `NetworkLink`/`CreditLink`
		// instances; nothing shares storage across routers, so the item written this cycle
		// has to be physically moved onto the neighbor's side of the wire before that
		// neighbor's own `wakeup_local`/`input_phase` can see it next cycle.
		for id in 0..self.routers.len()
		{
			router::relay_links(&mut self.routers, id, &neighbor_of);
		}

		if self.config.router.swizzle_swap
		{
			for id in 0..self.routers.len()
			{
				router::swap_inport(&mut self.routers, id, &neighbor_of, &mut self.rng, cycle);
			}
			for id in 0..self.routers.len()
			{
				router::chk_critical_deflect(&mut self.routers, id, &neighbor_of);
			}
		}
		// Every router is driven every cycle regardless of which links actually delivered
		// something (spec.md §5: fixed stage order, not event-driven dispatch); draining the
		// scheduler here just keeps its circular buffer from growing unbounded.
		self.scheduler.advance();
		Ok(())
	}

	/// `scanNetwork`-style diagnostic dump (`GarnetNetwork::scanNetwork` in
	/// `original_source`): one line per router summarizing occupancy and critical inport,
	/// for debugging a stalled or deadlocked run.
	pub fn debug_dump(&self, cycle:Time) -> String
	{
		let mut out = format!("network state at cycle {}\n", cycle);
		for router in &self.routers
		{
			let critical = router.critical_inport().map(|c| format!("{:?}", c.direction)).unwrap_or_else(|| "none".to_string());
			out.push_str(&format!("  router {:>3}: occupancy={} critical={}\n", router.id, router.occupancy(), critical));
		}
		out.push_str(&format!("  total memory: {}\n", quantify::human_bytes(self.total_memory())));
		out
	}
}

impl Quantifiable for Network
{
	fn total_memory(&self) -> usize
	{
		std::mem::size_of::<Self>()
			+ self.config.total_memory()
			+ self.routers.total_memory()
			+ self.scheduler.total_memory()
			+ self.rng.total_memory()
			+ self.stats.total_memory()
	}

	fn print_memory_breakdown(&self)
	{
		println!("config    : {}", quantify::human_bytes(self.config.total_memory()));
		println!("routers   : {}", quantify::human_bytes(self.routers.total_memory()));
		println!("scheduler : {}", quantify::human_bytes(self.scheduler.total_memory()));
		println!("rng       : {}", quantify::human_bytes(self.rng.total_memory()));
		println!("stats     : {}", quantify::human_bytes(self.stats.total_memory()));
	}

	fn forecast_total_memory(&self) -> usize { self.total_memory() }
}

/// Computes a destination NI's router id for `RoutingAlgorithm::Xy`/`Custom` shapes, where
/// NIs map 1:1 onto routers (spec.md §4.9's scope: "one NI per router").
pub fn ni_to_router(ni:usize, algorithm:RoutingAlgorithm) -> usize
{
	let _ = algorithm;
	ni
}

#[cfg(test)]
mod tests
{
	use super::*;
	use crate::config::RouterConfig;

	fn mesh_config(rows:usize, cols:usize, torus:bool) -> NetworkConfig
	{
		let mut config = NetworkConfig::default();
		config.num_rows = Some(rows);
		config.num_cols = cols;
		config.torus = torus;
		config.router = RouterConfig::default();
		config
	}

	#[test]
	fn east_wraps_from_the_last_column_on_a_torus()
	{
		// 4x4 torus, router id=3 is (row0,col3); East wraps to router 0 (spec.md §8 scenario 6).
		assert_eq!(get_router_in_dirn(Direction::East, 3, 4, 4), 0);
	}

	#[test]
	fn north_wraps_from_the_last_row_back_to_row_zero()
	{
		// 4x4 torus, router id=12 is (row3,col0), the last row; North wraps to router 0
		// (spec.md §8 scenario 6: "id=12 moving North returns router id=0").
		assert_eq!(get_router_in_dirn(Direction::North, 12, 4, 4), 0);
	}

	#[test]
	fn south_wraps_from_row_zero_to_the_last_row()
	{
		assert_eq!(get_router_in_dirn(Direction::South, 0, 4, 4), 12);
	}

	#[test]
	fn west_wraps_from_the_first_column()
	{
		assert_eq!(get_router_in_dirn(Direction::West, 0, 4, 4), 3);
	}

	#[test]
	fn interior_neighbors_do_not_wrap()
	{
		assert_eq!(get_router_in_dirn(Direction::East, 5, 4, 4), 6);
		assert_eq!(get_router_in_dirn(Direction::North, 5, 4, 4), 9);
		assert_eq!(get_router_in_dirn(Direction::South, 5, 4, 4), 1);
		assert_eq!(get_router_in_dirn(Direction::West, 5, 4, 4), 4);
	}

	#[test]
	fn new_network_builds_one_router_per_cell()
	{
		let network = Network::new(mesh_config(2, 2, true), 1).unwrap();
		assert_eq!(network.num_routers(), 4);
	}

	#[test]
	fn inject_fills_the_local_vc_and_eject_drains_nothing_without_a_route()
	{
		let mut network = Network::new(mesh_config(2, 2, true), 1).unwrap();
		let id = network.inject(0, 2, 2, 0, 0);
		assert!(id.is_some());
		assert_eq!(network.eject(0, 0), None);
	}

	#[test]
	fn tick_is_benign_on_an_idle_network()
	{
		let mut network = Network::new(mesh_config(3, 3, false), 2).unwrap();
		for cycle in 0..4
		{
			assert!(network.tick(cycle).is_ok());
		}
	}

	#[test]
	fn a_single_injected_flit_eventually_reaches_its_destination()
	{
		// 1x4 ring (mesh disabled for rows but torus columns wrap), so router 0's East chain
		// reaches every other router. Inject at 0 destined for NI 3's router and pump cycles
		// until it shows up at router 3's ejection point.
		let mut config = mesh_config(1, 4, true);
		config.router.routing_algorithm = RoutingAlgorithm::Xy;
		let mut network = Network::new(config, 3).unwrap();
		network.inject(0, 3, 3, 0, 0).unwrap();
		let mut ejected = None;
		for cycle in 0..20
		{
			network.tick(cycle).unwrap();
			if let Some(flit) = network.eject(3, cycle)
			{
				ejected = Some(flit);
				break;
			}
		}
		assert!(ejected.is_some(), "flit never reached router 3 within 20 cycles");
	}
}
