//! Help text listing every event and its argument shape.

use std::io::{self, Write};

use super::descriptor::EventDescriptor;
use super::router::EventTable;

/// Writes the usage block for both tables.
///
/// # Errors
///
/// Propagates write failures.
pub fn write_usage<W: Write>(writer: &mut W, program: &str) -> io::Result<()> {
    let width = EventTable::Device
        .descriptors()
        .iter()
        .chain(EventTable::System.descriptors())
        .map(|descriptor| descriptor.name.len())
        .max()
        .unwrap_or_default();

    writeln!(writer, "Usage: {program} <event> [argument]...")?;
    writeln!(writer)?;
    writeln!(writer, "Device events (exact names):")?;
    write_table(writer, EventTable::Device.descriptors(), width)?;
    writeln!(writer)?;
    writeln!(writer, "System events (names match case-insensitively):")?;
    write_table(writer, EventTable::System.descriptors(), width)
}

fn write_table<W: Write>(
    writer: &mut W,
    descriptors: &[EventDescriptor],
    width: usize,
) -> io::Result<()> {
    for descriptor in descriptors {
        let line = format!(
            "  {:width$}  {}",
            descriptor.name,
            descriptor.signature(),
        );
        writeln!(writer, "{}    {}", line.trim_end(), descriptor.summary)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered() -> String {
        let mut buffer = Vec::new();
        write_usage(&mut buffer, "IARM_event_sender").expect("render usage");
        String::from_utf8(buffer).expect("utf8")
    }

    #[test]
    fn lists_every_event_with_its_shape() {
        let usage = rendered();
        for descriptor in EventTable::Device
            .descriptors()
            .iter()
            .chain(EventTable::System.descriptors())
        {
            assert!(usage.contains(descriptor.name), "{} missing", descriptor.name);
        }
        assert!(usage.contains("IARM_HdmiInHotPlug"));
        assert!(usage.contains("<port:int> <connected:bool>"));
    }

    #[test]
    fn starts_with_usage_line() {
        assert!(rendered().starts_with("Usage: IARM_event_sender <event> [argument]..."));
    }
}
