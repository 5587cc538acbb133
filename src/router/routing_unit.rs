/*!

`RoutingUnit` (spec.md §4.4): direction<->index maps for in/out ports, a
routing table, and `outport_compute`.

*/

use std::collections::HashSet;
use std::mem::size_of;
use crate::config::RoutingAlgorithm;
use crate::error::Error;
use crate::{error,source_location};
use crate::flit::{RouteInfo,Direction};
use crate::quantify::Quantifiable;

/// Fixed port index for each direction, shared by every router (spec.md §4.4's
/// "direction<->index maps"). `Local` is always the last port.
pub const PORT_ORDER: [Direction; 5] = [Direction::North, Direction::East, Direction::South, Direction::West, Direction::Local];

pub fn direction_to_port(direction:Direction) -> usize
{
	PORT_ORDER.iter().position(|&d| d == direction).expect("PORT_ORDER covers every Direction")
}

pub fn port_to_direction(port:usize) -> Direction
{
	PORT_ORDER[port]
}

/// A routing table entry for table-based routing (spec.md §3): the set of destination NIs
/// reachable through `direction`, plus a tie-break weight.
#[derive(Debug,Clone)]
pub struct RoutingTableEntry
{
	pub direction: Direction,
	pub destinations: HashSet<usize>,
	pub weight: u32,
}

/// Hand-written rather than derived: `destinations` is a `HashSet<usize>`, approximated
/// by its length rather than walked bucket by bucket.
pub struct RoutingUnit
{
	pub my_id: usize,
	pub num_cols: usize,
	/// `None` when the harness runs a non-mesh shape (spec.md §6: `num_rows <= 0` means
	/// non-mesh); `XY_`/`CUSTOM_` require `Some`.
	pub num_rows: Option<usize>,
	pub torus: bool,
	pub algorithm: RoutingAlgorithm,
	pub table: Vec<RoutingTableEntry>,
}

impl Quantifiable for RoutingUnit
{
	fn total_memory(&self) -> usize
	{
		size_of::<Self>() + self.table.iter().map(|entry| size_of::<RoutingTableEntry>() + entry.destinations.len() * size_of::<usize>()).sum::<usize>()
	}
	fn print_memory_breakdown(&self) { unimplemented!() }
	fn forecast_total_memory(&self) -> usize { self.total_memory() }
}

impl RoutingUnit
{
	pub fn new(my_id:usize, num_cols:usize, num_rows:Option<usize>, torus:bool, algorithm:RoutingAlgorithm) -> RoutingUnit
	{
		RoutingUnit{ my_id, num_cols, num_rows, torus, algorithm, table: Vec::new() }
	}

	/// `outport_compute(route, in_port, in_direction) -> out_port` (spec.md §4.4).
	/// Returns `(outport_index, outport_direction)`, or `UnreachableRoute` if no algorithm
	/// can resolve a destination (spec.md §7: fatal, topology/routing-table mismatch).
	pub fn outport_compute(&self, route:&RouteInfo, in_direction:Direction) -> Result<(usize,Direction), Error>
	{
		if route.dst_router == self.my_id
		{
			return Ok((direction_to_port(Direction::Local), Direction::Local));
		}
		let direction = match self.algorithm
		{
			RoutingAlgorithm::Table => self.table_route(route)?,
			RoutingAlgorithm::Xy => self.xy_route(route.dst_router)?,
			RoutingAlgorithm::Custom => self.custom_route(route.dst_router, in_direction)?,
		};
		Ok((direction_to_port(direction), direction))
	}

	fn table_route(&self, route:&RouteInfo) -> Result<Direction, Error>
	{
		let mut best: Option<&RoutingTableEntry> = None;
		for entry in &self.table
		{
			if entry.destinations.contains(&route.dst_ni)
			{
				best = Some(match best
				{
					None => entry,
					Some(current) =>
					{
						if entry.weight < current.weight
						{
							entry
						}
						else if entry.weight == current.weight && direction_to_port(entry.direction) < direction_to_port(current.direction)
						{
							entry
						}
						else
						{
							current
						}
					}
				});
			}
		}
		best.map(|entry| entry.direction).ok_or_else(|| error!(unreachable_route, self.my_id, route.dst_ni))
	}

	fn grid_position(&self, id:usize) -> (usize,usize)
	{
		let row = id / self.num_cols;
		let col = id % self.num_cols;
		(row, col)
	}

	/// `XY_`: horizontal first until column matches, then vertical; torus wraps when it
	/// shortens the path (spec.md §4.4).
	fn xy_route(&self, dst:usize) -> Result<Direction, Error>
	{
		let rows = self.num_rows.ok_or_else(|| error!(unsupported_configuration, "XY_ routing requires a mesh shape".to_string()))?;
		let (my_row, my_col) = self.grid_position(self.my_id);
		let (dst_row, dst_col) = self.grid_position(dst);
		if my_col != dst_col
		{
			return Ok(self.column_step(my_col, dst_col));
		}
		if my_row != dst_row
		{
			return Ok(self.row_step(my_row, dst_row, rows));
		}
		Err(error!(unreachable_route, self.my_id, dst))
	}

	fn column_step(&self, my_col:usize, dst_col:usize) -> Direction
	{
		let forward = (dst_col + self.num_cols - my_col) % self.num_cols;
		let backward = (my_col + self.num_cols - dst_col) % self.num_cols;
		if self.torus && backward < forward
		{
			Direction::West
		}
		else if dst_col >= my_col || self.torus
		{
			Direction::East
		}
		else
		{
			Direction::West
		}
	}

	/// Matches `get_router_in_dirn`'s convention (`router.rs`/`network.rs`): `North`
	/// increases the row index (wrapping at the last row back to row 0), `South`
	/// decreases it (wrapping at row 0 back to the last row).
	fn row_step(&self, my_row:usize, dst_row:usize, num_rows:usize) -> Direction
	{
		let forward = (dst_row + num_rows - my_row) % num_rows;
		let backward = (my_row + num_rows - dst_row) % num_rows;
		if self.torus && backward < forward
		{
			Direction::South
		}
		else if dst_row >= my_row || self.torus
		{
			Direction::North
		}
		else
		{
			Direction::South
		}
	}

	/// `CUSTOM_`: mesh-aware, avoids routing back out of the inport's reverse direction
	/// (spec.md §4.4) by preferring the other axis when plain XY would send the flit the
	/// way it came from.
	fn custom_route(&self, dst:usize, in_direction:Direction) -> Result<Direction, Error>
	{
		let rows = self.num_rows.ok_or_else(|| error!(unsupported_configuration, "CUSTOM_ routing requires a mesh shape".to_string()))?;
		let (my_row, my_col) = self.grid_position(self.my_id);
		let (dst_row, dst_col) = self.grid_position(dst);
		// A flit that arrived through the `in_direction` port came from that neighbor; an
		// outport in the same direction would be an immediate U-turn back to it.
		let forbidden = in_direction;
		if my_col != dst_col
		{
			let step = self.column_step(my_col, dst_col);
			if step != forbidden
			{
				return Ok(step);
			}
		}
		if my_row != dst_row
		{
			let step = self.row_step(my_row, dst_row, rows);
			if step != forbidden
			{
				return Ok(step);
			}
		}
		if my_col != dst_col
		{
			return Ok(self.column_step(my_col, dst_col));
		}
		Err(error!(unreachable_route, self.my_id, dst))
	}
}

#[cfg(test)]
mod tests
{
	use super::*;

	#[test]
	fn local_destination_routes_to_local_port()
	{
		let unit = RoutingUnit::new(5, 4, Some(4), false, RoutingAlgorithm::Xy);
		let route = RouteInfo{src_ni:0,dst_ni:5,dst_router:5,hops:0};
		assert_eq!(unit.outport_compute(&route, Direction::North).unwrap(), (direction_to_port(Direction::Local), Direction::Local));
	}

	#[test]
	fn xy_goes_horizontal_before_vertical()
	{
		// 4x4 mesh, id = row*4+col. Router 5 is row1,col1; destination 7 is row1,col3.
		let unit = RoutingUnit::new(5, 4, Some(4), false, RoutingAlgorithm::Xy);
		let route = RouteInfo{src_ni:0,dst_ni:7,dst_router:7,hops:0};
		let (_,dir) = unit.outport_compute(&route, Direction::West).unwrap();
		assert_eq!(dir, Direction::East);
	}

	#[test]
	fn xy_goes_vertical_once_column_matches()
	{
		let unit = RoutingUnit::new(5, 4, Some(4), false, RoutingAlgorithm::Xy);
		let route = RouteInfo{src_ni:0,dst_ni:13,dst_router:13,hops:0};
		let (_,dir) = unit.outport_compute(&route, Direction::West).unwrap();
		assert_eq!(dir, Direction::North);
	}

	#[test]
	fn torus_wraps_east_from_last_column()
	{
		// 4x4 torus, router id=3 (row0,col3) moving East wraps to router 0 (spec.md §8 scenario 6).
		let unit = RoutingUnit::new(3, 4, Some(4), true, RoutingAlgorithm::Xy);
		let route = RouteInfo{src_ni:0,dst_ni:0,dst_router:0,hops:0};
		let (_,dir) = unit.outport_compute(&route, Direction::West).unwrap();
		assert_eq!(dir, Direction::East);
	}

	#[test]
	fn custom_avoids_sending_back_out_the_inport()
	{
		// Router 5 is row1,col1. Destination 8 is row2,col0: plain XY would go West
		// (column first) which is where this flit just came from; CUSTOM_ should instead
		// take the vertical step North (row index increases towards row2).
		let unit = RoutingUnit::new(5, 4, Some(4), false, RoutingAlgorithm::Custom);
		let route = RouteInfo{src_ni:0,dst_ni:8,dst_router:8,hops:0};
		let (_,dir) = unit.outport_compute(&route, Direction::West).unwrap();
		assert_eq!(dir, Direction::North);
	}

	#[test]
	fn table_route_breaks_ties_by_weight_then_index()
	{
		let mut unit = RoutingUnit::new(0, 4, Some(4), false, RoutingAlgorithm::Table);
		unit.table.push(RoutingTableEntry{direction:Direction::South, destinations:[9].into_iter().collect(), weight:5});
		unit.table.push(RoutingTableEntry{direction:Direction::East, destinations:[9].into_iter().collect(), weight:1});
		let route = RouteInfo{src_ni:0,dst_ni:9,dst_router:9,hops:0};
		let (_,dir) = unit.outport_compute(&route, Direction::North).unwrap();
		assert_eq!(dir, Direction::East);
	}

	#[test]
	fn unreachable_destination_is_an_error()
	{
		let unit = RoutingUnit::new(0, 4, Some(4), false, RoutingAlgorithm::Table);
		let route = RouteInfo{src_ni:0,dst_ni:9,dst_router:9,hops:0};
		assert!(unit.outport_compute(&route, Direction::North).is_err());
	}
}
