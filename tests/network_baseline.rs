mod common;

use garnet_noc::network::Network;

/// Injection-to-ejection latency across a deterministic multi-hop path: a 1x4 linear mesh
/// (`torus:false`) forces XY routing to carry the flit East three times in a row, with no
/// wraparound shortcut available. Each hop costs one router cycle (the route decision latched
/// on arrival isn't visible to the allocator until the following cycle) plus one link cycle;
/// the final grant onto the destination's Local output costs one more link cycle before
/// `eject` can drain it.
#[test]
fn baseline_injection_to_ejection_latency_across_three_hops()
{
	let router_config = common::build_router_config(common::RouterConfigBuilder::default());
	let config = common::build_network_config(common::NetworkConfigBuilder{
		num_rows: 1,
		num_cols: 4,
		torus: false,
		router: router_config,
	});
	let mut network = Network::new(config, 0).unwrap();

	assert!(network.inject(0, 3, 3, 0, 10).is_some(), "router 0's Local VC0 has room for the first flit");

	let mut ejected = None;
	for cycle in 10..=25
	{
		network.tick(cycle).unwrap();
		if let Some(flit) = network.eject(3, cycle)
		{
			ejected = Some((cycle, flit));
			break;
		}
	}

	let (cycle, flit) = ejected.expect("the flit must reach router 3 within the window");
	assert_eq!(cycle, 17, "3 hops * (1 router cycle + 1 link cycle) + 1 final link cycle onto the NI");
	assert_eq!(flit.network_entry_time, 10);
	assert_eq!(network.stats.ejected_flits, 1);
	assert_eq!(network.stats.injected_flits, 1);
	assert_eq!(network.stats.total_latency, 7);
}

/// A flit injected straight for its own router's NI is ejected the very next cycle: no
/// hop is needed, and `Network::inject` already latches the route at injection time.
#[test]
fn injecting_to_the_local_router_ejects_on_the_first_grant()
{
	let router_config = common::build_router_config(common::RouterConfigBuilder::default());
	let config = common::build_network_config(common::NetworkConfigBuilder{
		num_rows: 1,
		num_cols: 4,
		torus: false,
		router: router_config,
	});
	let mut network = Network::new(config, 0).unwrap();

	assert!(network.inject(1, 1, 1, 0, 0).is_some());

	let mut ejected = None;
	for cycle in 0..=5
	{
		network.tick(cycle).unwrap();
		if let Some(flit) = network.eject(1, cycle)
		{
			ejected = Some(cycle);
			let _ = flit;
			break;
		}
	}
	assert_eq!(ejected, Some(1), "granted at cycle 0, visible to eject once the Local link's one-cycle delay elapses");
}
