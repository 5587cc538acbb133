/*!

`SwitchAllocator` (spec.md §4.5): a two-stage per-cycle arbiter, grounded on
`caminos-lib`'s iSLIP allocator (`allocator/islip.rs`'s `RoundVec`, present in
the sibling fork kept in the retrieval pack under
`cristinabrinza-caminos/src/allocator/islip.rs`): a rotating priority pointer
per arbitration line, advanced past the winner so starvation is bounded.

Stage 1 nominates one VC per input port; stage 2 resolves contention per
output port. Winners are applied immediately: the chosen input VC's flit is
handed to the `CrossbarSwitch`, the downstream credit is consumed, and on a
HEAD/HEAD_TAIL flit a fresh downstream VC is bound via `select_free_vc`.

*/

use quantifiable_derive::Quantifiable;//the derive macro
use crate::config::RouterConfig;
use crate::event::Time;
use crate::flit::FlitType;
use crate::quantify::Quantifiable;
use crate::vc::VcState;
use super::input_unit::InputUnit;
use super::output_unit::OutputUnit;
use super::crossbar::CrossbarSwitch;

/// One input port's nomination for this cycle: the VC it wants to send and the flit's
/// chosen downstream VC, if the destination VC is already known (bound at a previous
/// HEAD grant) or still to be picked (HEAD/HEAD_TAIL, via `select_free_vc`).
#[derive(Debug,Clone,Copy)]
struct Nomination
{
	input_vc: usize,
	output_port: usize,
}

#[derive(Quantifiable)]
pub struct SwitchAllocator
{
	/// Stage-1 round-robin pointer, one per input port (spec.md §4.5: "round-robin within
	/// the port, state lives across cycles").
	input_pointer: Vec<usize>,
	/// Stage-2 round-robin pointer, one per output port.
	output_pointer: Vec<usize>,
}

impl SwitchAllocator
{
	pub fn new(num_input_ports:usize, num_output_ports:usize) -> SwitchAllocator
	{
		SwitchAllocator{
			input_pointer: vec![0; num_input_ports],
			output_pointer: vec![0; num_output_ports],
		}
	}

	fn stage1_nominate(&mut self, port:usize, input:&InputUnit, config:&RouterConfig) -> Option<Nomination>
	{
		let _ = config;
		let eligible: Vec<usize> = (0..input.num_vcs())
			.filter(|&vc| input.peek_top_flit(vc).map_or(false,|f| f.has_route_decision()) && input.outport_of(vc).is_some())
			.collect();
		if eligible.is_empty() { return None; }
		let pointer = &mut self.input_pointer[port];
		let winner = round_robin_pick(&eligible, input.num_vcs(), pointer)?;
		let (output_port,_) = input.outport_of(winner)?;
		Some(Nomination{ input_vc: winner, output_port })
	}

	/// `wakeup()`: runs both arbitration stages and applies every winner's effects
	/// (credit bookkeeping, VC (de)allocation, crossbar hand-off, upstream credit emission).
	#[allow(clippy::too_many_arguments)]
	pub fn wakeup(
		&mut self,
		inputs: &mut [InputUnit],
		outputs: &mut [OutputUnit],
		crossbar: &mut CrossbarSwitch,
		config: &RouterConfig,
		cycle: Time,
		scheduler: &mut dyn crate::event::TickScheduler,
	)
	{
		let num_outputs = outputs.len();
		let mut nominations: Vec<Option<Nomination>> = (0..inputs.len())
			.map(|port| self.stage1_nominate(port, &inputs[port], config))
			.collect();

		// Filter out nominations the destination genuinely cannot accept: either the
		// bound downstream VC has no credit, or (still unbound) no free non-critical VC
		// exists in that vnet. Benign contention (spec.md §7): simply not nominated further.
		for (port, nomination) in nominations.iter_mut().enumerate()
		{
			if let Some(nom) = nomination
			{
				if !self.destination_can_accept(&inputs[port], outputs, nom.input_vc, nom.output_port, config)
				{
					*nomination = None;
				}
			}
		}

		for output_port in 0..num_outputs
		{
			let requesters: Vec<usize> = nominations.iter().enumerate()
				.filter_map(|(port, nom)| nom.filter(|n| n.output_port == output_port).map(|_| port))
				.collect();
			if requesters.is_empty() { continue; }
			let pointer = &mut self.output_pointer[output_port];
			let winner_port = match round_robin_pick(&requesters, inputs.len(), pointer)
			{
				Some(p) => p,
				None => continue,
			};
			let nomination = nominations[winner_port].take().expect("requester implies a nomination");
			self.grant(winner_port, nomination, inputs, outputs, crossbar, config, cycle, scheduler);
		}
	}

	fn destination_can_accept(&self, input:&InputUnit, outputs:&[OutputUnit], vc:usize, output_port:usize, config:&RouterConfig) -> bool
	{
		let output = &outputs[output_port];
		match input.output_vc_binding(vc)
		{
			Some(bound_vc) => output.has_credit(bound_vc),
			None =>
			{
				// `select_free_vc` only asks whether some VC is idle and non-critical; a fresh
				// HEAD/HEAD_TAIL binding still needs that candidate to actually have a free
				// downstream slot (spec.md section 3 invariant (a)), or this would grant straight
				// through an exhausted credit count.
				let vnet = vc / config.vcs_per_vnet;
				let vnet_start = vnet * config.vcs_per_vnet;
				match output.select_free_vc(vnet_start, config.vcs_per_vnet)
				{
					Some(candidate) => output.has_credit(candidate),
					None => false,
				}
			},
		}
	}

	#[allow(clippy::too_many_arguments)]
	fn grant(
		&self,
		input_port: usize,
		nomination: Nomination,
		inputs: &mut [InputUnit],
		outputs: &mut [OutputUnit],
		crossbar: &mut CrossbarSwitch,
		config: &RouterConfig,
		cycle: Time,
		scheduler: &mut dyn crate::event::TickScheduler,
	)
	{
		let Nomination{input_vc, output_port} = nomination;
		let flit = inputs[input_port].peek_top_flit(input_vc).copied().expect("nomination implies a ready flit");
		let opens = flit.flit_type.opens_vc();
		let closes = flit.flit_type.closes_vc();

		let bound_vc = if opens
		{
			let vnet = input_vc / config.vcs_per_vnet;
			let vnet_start = vnet * config.vcs_per_vnet;
			let chosen = outputs[output_port].select_free_vc(vnet_start, config.vcs_per_vnet)
				.expect("destination_can_accept already confirmed a free VC");
			inputs[input_port].set_output_vc_binding(input_vc, chosen);
			chosen
		}
		else
		{
			inputs[input_port].output_vc_binding(input_vc).expect("a bound VC's binding was recorded at HEAD-grant time")
		};

		if opens
		{
			outputs[output_port].set_vc_state(bound_vc, VcState::Active, cycle);
			outputs[output_port].set_owner(bound_vc, input_port, input_vc);
		}
		outputs[output_port].decrement_credit(bound_vc);

		let mut flit = inputs[input_port].take_top_flit(input_vc).expect("peeked flit must still be present");
		inputs[input_port].emit_credit(input_vc, cycle, scheduler);
		if closes
		{
			inputs[input_port].set_vc_idle(input_vc);
			outputs[output_port].clear_owner(bound_vc);
		}

		// The downstream InputUnit selects a VC buffer by `flit.vc`, so the flit must carry
		// the VC it was just bound to at this hop, not the one it arrived on.
		flit.vc = bound_vc;
		crossbar.update_sw_winner(output_port, flit);
	}
}

/// `RoundVec`-style rotating priority: the winner is the lowest-indexed candidate at or
/// after `*pointer` (wrapping), and `*pointer` advances past it so every candidate is
/// eventually favored (spec.md §4.5: "starvation is bounded by round-robin").
fn round_robin_pick(candidates:&[usize], space:usize, pointer:&mut usize) -> Option<usize>
{
	if candidates.is_empty() { return None; }
	let winner = candidates.iter().copied().filter(|&c| c >= *pointer).min()
		.or_else(|| candidates.iter().copied().min())
		.expect("candidates is non-empty");
	*pointer = (winner + 1) % space.max(1);
	Some(winner)
}
