/*!

Lightweight memory accounting, in the style of `caminos-lib`'s own
`quantify` module: every long-lived structure (buffers, VCs, the event
queue) can report how many bytes it holds, which is handy when sizing
`buffer_size`/`vcs_per_vnet` for a large mesh. Derived automatically for
plain-data structs with `#[derive(Quantifiable)]` from `quantifiable-derive`;
implemented by hand for the few generic containers that need it.

*/

use std::mem::size_of;

pub trait Quantifiable
{
	/// Total number of bytes owned by this value, including heap allocations.
	fn total_memory(&self) -> usize;
	/// Prints a breakdown of `total_memory` to stdout. Most types leave this `unimplemented!()`
	/// until someone actually needs the detail.
	fn print_memory_breakdown(&self);
	/// An upper estimate of `total_memory` usable before the value is actually built.
	fn forecast_total_memory(&self) -> usize;
}

impl<T:Quantifiable> Quantifiable for Vec<T>
{
	fn total_memory(&self) -> usize
	{
		size_of::<Self>() + self.iter().map(|x|x.total_memory()).sum::<usize>()
	}
	fn print_memory_breakdown(&self) { unimplemented!() }
	fn forecast_total_memory(&self) -> usize { unimplemented!() }
}

impl<T:Quantifiable> Quantifiable for Option<T>
{
	fn total_memory(&self) -> usize
	{
		size_of::<Self>() + self.as_ref().map_or(0,|x|x.total_memory())
	}
	fn print_memory_breakdown(&self) { unimplemented!() }
	fn forecast_total_memory(&self) -> usize { unimplemented!() }
}

macro_rules! quantifiable_primitive {
	($t:ty) => {
		impl Quantifiable for $t
		{
			fn total_memory(&self) -> usize { size_of::<Self>() }
			fn print_memory_breakdown(&self) {}
			fn forecast_total_memory(&self) -> usize { size_of::<Self>() }
		}
	}
}
quantifiable_primitive!(usize);
quantifiable_primitive!(u64);
quantifiable_primitive!(u32);
quantifiable_primitive!(i32);
quantifiable_primitive!(bool);

/// Pretty-prints a byte count, e.g. `human_bytes(1536) == "1.50KiB"`.
pub fn human_bytes(bytes:usize) -> String
{
	const UNITS: [&str; 5] = ["B","KiB","MiB","GiB","TiB"];
	let mut value = bytes as f64;
	let mut unit = 0;
	while value >= 1024.0 && unit < UNITS.len()-1
	{
		value /= 1024.0;
		unit += 1;
	}
	if unit == 0
	{
		format!("{}{}", bytes, UNITS[0])
	}
	else
	{
		format!("{:.2}{}", value, UNITS[unit])
	}
}
