/*!
garnet-noc
==========

A cycle-accurate virtual-channel router core for 2D mesh/torus
Networks-on-Chip, grounded on gem5's Garnet2.0 router model. Implements the
baseline input-queued wormhole pipeline (`InputUnit` -> `RoutingUnit` ->
`SwitchAllocator` -> `CrossbarSwitch` -> `OutputUnit`) plus the SwizzleSwap
lateral buffer-shuffling extension and its Critical-Bubble Deflection
escape valve.

# Usage

This crate is `garnet-noc`. To use it add `garnet-noc` to your dependencies
in your project's `Cargo.toml`.

```toml
[dependencies]
garnet-noc = "0.1"
```

# Scope

This crate simulates the router microarchitecture: VC allocation, switch
allocation, the crossbar datapath, and the SwizzleSwap/Critical-Bubble
Deflection extensions, on a closed-form 2D mesh or torus with one network
interface per router. It does not include a configuration-file grammar, a
results database, or an experiment-sweep harness; callers build a
[`config::NetworkConfig`] directly and drive [`network::Network`] one cycle
at a time.

# Public interface

* [`config`] — typed, validated configuration (`RouterConfig`, `NetworkConfig`).
* [`flit`] — the atomic transport unit, `Direction`, `Credit`.
* [`vc`] — `VirtualChannel`/`OutputVcState`, the per-VC allocation state machine.
* [`link`] — the one-cycle `NetworkLink`/`CreditLink` delay lines.
* [`event`] — the cycle clock and `TickScheduler`.
* [`router`] — `Router` and its submodules (`InputUnit`, `OutputUnit`, `RoutingUnit`,
  `SwitchAllocator`, `CrossbarSwitch`), plus the SwizzleSwap/deflection free functions.
* [`network`] — the built-in mesh/torus harness: topology, injection/ejection, the
  per-cycle `tick`.
* [`measures`] — `RouterStats`/`NetworkStats`.
* [`error`] — the crate's `Result` error type.
* [`quantify`] — the `Quantifiable` memory-accounting trait; every long-lived structure
  implements it, and `Network::debug_dump` reports the total via `quantify::human_bytes`.

*/

pub mod error;
pub mod config;
pub mod event;
pub mod flit;
pub mod vc;
pub mod link;
pub mod measures;
pub mod quantify;
pub mod router;
pub mod network;

pub use config::{NetworkConfig,RouterConfig};
pub use error::Error;
pub use flit::{Direction,Flit,FlitType};
pub use network::Network;
pub use quantifiable_derive::Quantifiable;//the derive macro
pub use router::Router;
