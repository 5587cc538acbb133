/*!

This module manages errors for the router core, favouring a graceful
`Result` return over `panic!`. Cases that genuinely cannot happen (a closed
enum match falling through) can still use `unreachable!`.

Instead of `expect` or `unwrap_or_else` try
* `map_err` like in `.map_err(|e| Error::invariant_violation(source_location!(), router_id, inport, cycle, e))?;`
* `ok_or_else` like in `.ok_or_else(|| Error::unreachable_route(source_location!(), router_id, destination))?;`

Instead of `panic!` try
* Return an error. E.g., by `return Err(Error::unsupported_configuration(source_location!(), "NON_MINIMAL_ policy".into()));`

The `error!` macro eases the writing a little. E.g., `error!(bad_argument, "zero virtual channels".into())`.

Benign contention (no credit, no free VC, no swap candidate) is never an
`Error`: it is represented with plain `Option`/`bool`/coded-integer returns
and counted in `measures`, per the taxonomy in the design document.

*/

use std::fmt::{Display,Formatter};

/// The main error type, used in `Result<_,Error>` throughout the crate.
#[derive(Debug)]
pub struct Error
{
	pub source_location: SourceLocation,
	pub kind: ErrorKind,
	pub message: Option<String>,
}

/// Where in the source an error was raised. Built by the `source_location!()` macro.
#[derive(Debug)]
pub struct SourceLocation
{
	pub file: &'static str,
	pub line: u32,
	pub column: u32,
}

#[derive(Debug)]
pub enum ErrorKind
{
	/// A SwizzleSwap/bubble-deflection protocol invariant failed to hold.
	/// This always indicates a bug in the swap protocol, never benign contention.
	InvariantViolation{
		router_id: usize,
		inport: Option<usize>,
		cycle: crate::event::Time,
	},
	/// `RoutingUnit::outport_compute` could not resolve an outport for a destination.
	/// Indicates a topology/routing-table mismatch.
	UnreachableRoute{
		router_id: usize,
		destination: usize,
	},
	/// A configuration combination is not implemented (e.g. `NON_MINIMAL_` policy).
	UnsupportedConfiguration,
	/// Some method received a structurally invalid argument.
	BadArgument,
}

#[macro_export]
macro_rules! source_location{
	() => {
		$crate::error::SourceLocation{
			file: file!(),
			line: line!(),
			column: column!(),
		}
	}
}

#[macro_export]
macro_rules! error{
	($kind:ident, $($args:tt)*) => {{
		$crate::error::Error::$kind( $crate::source_location!(), $($args)* )
	}};
	($kind:ident) => {{
		$crate::error::Error::$kind( $crate::source_location!() )
	}};
}

use ErrorKind::*;

impl Error
{
	pub fn with_message(mut self, message:String) -> Error
	{
		match self.message
		{
			Some(ref mut text) => { text.push_str(&message); },
			None => self.message = Some(message),
		}
		self
	}
	pub fn invariant_violation(source_location:SourceLocation, router_id:usize, inport:Option<usize>, cycle:crate::event::Time) -> Error
	{
		Error{ source_location, kind: InvariantViolation{router_id,inport,cycle}, message:None }
	}
	pub fn unreachable_route(source_location:SourceLocation, router_id:usize, destination:usize) -> Error
	{
		Error{ source_location, kind: UnreachableRoute{router_id,destination}, message:None }
	}
	pub fn unsupported_configuration(source_location:SourceLocation, detail:String) -> Error
	{
		Error{ source_location, kind: UnsupportedConfiguration, message:Some(detail) }
	}
	pub fn bad_argument(source_location:SourceLocation, detail:String) -> Error
	{
		Error{ source_location, kind: BadArgument, message:Some(detail) }
	}
}

impl Display for Error
{
	fn fmt(&self, formatter:&mut Formatter<'_>) -> Result<(), std::fmt::Error>
	{
		let Error{source_location:location,kind,message} = self;
		writeln!(formatter,"Error at file {} line {} column {}.",location.file,location.line,location.column)?;
		if let Some(text) = message
		{
			writeln!(formatter,"{}",text)?;
		}
		kind.fmt(formatter)?;
		Ok(())
	}
}

impl Display for ErrorKind
{
	fn fmt(&self, formatter:&mut Formatter<'_>) -> Result<(), std::fmt::Error>
	{
		match self
		{
			InvariantViolation{router_id,inport,cycle} =>
			{
				writeln!(formatter,"InvariantViolation: router {} inport {:?} at cycle {}: a SwizzleSwap/bubble-deflection invariant failed.",router_id,inport,cycle)?;
			},
			UnreachableRoute{router_id,destination} =>
			{
				writeln!(formatter,"UnreachableRoute: router {} could not compute an outport towards destination {}.",router_id,destination)?;
			},
			UnsupportedConfiguration =>
			{
				writeln!(formatter,"UnsupportedConfiguration: not implemented.")?;
			},
			BadArgument =>
			{
				writeln!(formatter,"BadArgument: bad argument given to a function.")?;
			},
		}
		Ok(())
	}
}

impl std::error::Error for Error {}
