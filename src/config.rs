/*!

Core-exposed configuration (spec.md §6). `caminos-lib` parses whole
experiment sweeps out of a textual grammar (`ConfigurationValue` plus
`gramatica`); that concern belongs to the external harness this crate
excludes by scope (SPEC_FULL.md §1). This module instead exposes plain,
validated, typed configuration structs, in the shape of `caminos-lib`'s
`RouterBuilderArgument`/`AllocatorBuilderArgument` builder-argument structs.

*/

use quantifiable_derive::Quantifiable;//the derive macro
use crate::error::Error;
use crate::quantify::Quantifiable;
use crate::{error,source_location};

/// Routing algorithm selected for `RoutingUnit::outport_compute`.
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum RoutingAlgorithm
{
	/// Table-based: pick the outport(s) whose routing table entry contains the destination.
	Table,
	/// Deterministic dimension order, torus wrap-around allowed when it shortens the path.
	Xy,
	/// Mesh-aware algorithm that only avoids the inport's reverse direction.
	Custom,
}

impl Quantifiable for RoutingAlgorithm
{
	fn total_memory(&self) -> usize { std::mem::size_of::<Self>() }
	fn print_memory_breakdown(&self) {}
	fn forecast_total_memory(&self) -> usize { std::mem::size_of::<Self>() }
}

/// Policy followed by the SwizzleSwap extension.
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum SwizzlePolicy
{
	/// Exactly one empty critical inport maintained per router. Fully specified.
	Minimal,
	/// Reserved for deflection routing. Unimplemented: see DESIGN.md open question.
	NonMinimal,
}

impl Quantifiable for SwizzlePolicy
{
	fn total_memory(&self) -> usize { std::mem::size_of::<Self>() }
	fn print_memory_breakdown(&self) {}
	fn forecast_total_memory(&self) -> usize { std::mem::size_of::<Self>() }
}

/// Whether injection is driven until a cycle budget or until a count of "marked" flits is observed.
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum SimType
{
	Standard,
	/// Injection ends once `marked_flits` marked flits have been received (`Network::check_marked_flits`).
	Marked,
}

impl Quantifiable for SimType
{
	fn total_memory(&self) -> usize { std::mem::size_of::<Self>() }
	fn print_memory_breakdown(&self) {}
	fn forecast_total_memory(&self) -> usize { std::mem::size_of::<Self>() }
}

/// Whether a virtual network only ever carries control flits (single-flit packets,
/// e.g. acks) or can carry full data packets. Determines which buffer-capacity
/// constant a VC in that vnet is built with. Silent in spec.md; resolved from
/// `GarnetNetwork`'s `DATA_VNET_`/`CTRL_VNET_` classification in `original_source`.
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum VnetClass
{
	Data,
	Ctrl,
}

impl Quantifiable for VnetClass
{
	fn total_memory(&self) -> usize { std::mem::size_of::<Self>() }
	fn print_memory_breakdown(&self) {}
	fn forecast_total_memory(&self) -> usize { std::mem::size_of::<Self>() }
}

/// Per-router configuration (spec.md §6).
#[derive(Debug,Clone,Quantifiable)]
pub struct RouterConfig
{
	pub vcs_per_vnet: usize,
	pub vnets: Vec<VnetClass>,
	pub buffers_per_data_vc: usize,
	pub buffers_per_ctrl_vc: usize,
	pub routing_algorithm: RoutingAlgorithm,
	pub swizzle_swap: bool,
	pub policy: Option<SwizzlePolicy>,
	/// Bound on `swap_inport`'s retry loop (spec.md §9 open question: exposed as configurable).
	pub swap_retry_limit: usize,
	/// Future TDM-based swap cadence; currently unused by the pipeline (spec.md §6).
	pub tdm: usize,
}

impl RouterConfig
{
	pub fn num_vcs(&self) -> usize
	{
		self.vnets.len() * self.vcs_per_vnet
	}
	/// Validates and normalizes. `swizzle_swap=true` requires a policy (spec.md §6).
	pub fn validate(&self) -> Result<(), Error>
	{
		if self.vcs_per_vnet == 0 || self.vnets.is_empty()
		{
			return Err(error!(bad_argument,"vcs_per_vnet and vnets must be non-empty".to_string()));
		}
		if self.swizzle_swap && self.policy.is_none()
		{
			return Err(error!(bad_argument,"swizzle_swap=true requires a policy".to_string()));
		}
		if self.policy == Some(SwizzlePolicy::NonMinimal)
		{
			return Err(error!(unsupported_configuration,"NON_MINIMAL_ policy".to_string()));
		}
		Ok(())
	}
	pub fn buffers_for(&self, vnet_index:usize) -> usize
	{
		match self.vnets[vnet_index]
		{
			VnetClass::Data => self.buffers_per_data_vc,
			VnetClass::Ctrl => self.buffers_per_ctrl_vc,
		}
	}
}

impl Default for RouterConfig
{
	fn default() -> Self
	{
		RouterConfig{
			vcs_per_vnet: 1,
			vnets: vec![VnetClass::Data],
			buffers_per_data_vc: 4,
			buffers_per_ctrl_vc: 4,
			routing_algorithm: RoutingAlgorithm::Xy,
			swizzle_swap: false,
			policy: None,
			swap_retry_limit: 50,
			tdm: 0,
		}
	}
}

/// Network-wide configuration consumed by the built-in harness (`network.rs`).
#[derive(Debug,Clone,Quantifiable)]
pub struct NetworkConfig
{
	/// Number of rows in the mesh/torus. `<= 0` (represented here as `None`) means non-mesh.
	pub num_rows: Option<usize>,
	pub num_cols: usize,
	/// Whether East/West/North/South wrap around (torus) or not (mesh).
	pub torus: bool,
	pub ni_flit_size: usize,
	pub router: RouterConfig,
	pub warmup_cycles: crate::event::Time,
	pub marked_flits: usize,
	pub sim_type: SimType,
	pub enable_fault_model: bool,
}

impl Default for NetworkConfig
{
	fn default() -> Self
	{
		NetworkConfig{
			num_rows: Some(1),
			num_cols: 1,
			torus: false,
			ni_flit_size: 16,
			router: RouterConfig::default(),
			warmup_cycles: 0,
			marked_flits: 0,
			sim_type: SimType::Standard,
			enable_fault_model: false,
		}
	}
}

impl NetworkConfig
{
	pub fn validate(&self) -> Result<(), Error>
	{
		self.router.validate()?;
		if self.num_cols == 0
		{
			return Err(error!(bad_argument,"num_cols must be positive".to_string()));
		}
		Ok(())
	}
}
