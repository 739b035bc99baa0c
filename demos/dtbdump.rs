// ABOUTME: Example that loads a DTB file and dumps it through the cursor API
// ABOUTME: Shows header info, memory reservations, path lookup and a full property listing

use dtb_cursor::{Block, DeviceTree, DtbError};
use std::env;
use std::fs;
use std::process;

fn main() {
    let args: Vec<String> = env::args().collect();

    let Some(dtb_path) = args.get(1) else {
        eprintln!("Usage: {} <DTB file> [path to look up]", args[0]);
        process::exit(20);
    };

    if let Err(e) = dump_dtb_file(dtb_path, args.get(2).map(String::as_str)) {
        eprintln!("ERROR: {}", e);
        process::exit(20);
    }
}

fn dump_dtb_file(path: &str, lookup: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let dtb_data =
        fs::read(path).map_err(|e| format!("Failed to read DTB file '{}': {}", path, e))?;

    let tree = DeviceTree::new(&dtb_data)?;

    show_header(&tree);
    show_memory_reservations(&tree)?;

    if let Some(lookup) = lookup {
        show_lookup(&tree, lookup)?;
    }

    println!("🌳 Properties");
    println!("─────────────");
    dump_node(&tree, "", None)?;

    Ok(())
}

fn show_header(tree: &DeviceTree) {
    let header = tree.header();

    println!("📋 DTB Header Information");
    println!("─────────────────────────");
    println!("Total size:      {} bytes", header.totalsize);
    println!("Version:         {}", header.version);
    println!("Last compatible: {}", header.last_comp_version);
    println!("Boot CPU ID:     {}", header.boot_cpuid_phys);
    println!("Struct offset:   0x{:x}", header.off_dt_struct);
    println!("Struct size:     {} bytes", header.size_dt_struct);
    println!("Strings offset:  0x{:x}", header.off_dt_strings);
    println!("Strings size:    {} bytes", header.size_dt_strings);
    println!();
}

fn show_memory_reservations(tree: &DeviceTree) -> Result<(), DtbError> {
    println!("💾 Memory Reservations");
    println!("─────────────────────");

    let mut count = 0;
    for reservation in tree.memory_reservations() {
        let reservation = reservation?;
        println!(
            "Reservation {}: 0x{:016x} - 0x{:016x} (size: {} bytes)",
            count,
            reservation.address,
            reservation.address.saturating_add(reservation.size),
            reservation.size
        );
        count += 1;
    }
    if count == 0 {
        println!("No memory reservations found");
    }
    println!();

    Ok(())
}

fn show_lookup(tree: &DeviceTree, path: &str) -> Result<(), DtbError> {
    println!("🔍 Lookup: {}", path);
    println!("──────────");

    if let Some(node) = tree.find_node(path)? {
        let props = tree.properties(Some(&node)).count();
        let children = tree.children(Some(&node)).count();
        println!("node '{}': {} properties, {} children", node.name, props, children);
    } else if let Some(prop) = tree.find_property(path)? {
        println!("{} = {}", prop.name, format_value(&prop));
    } else {
        println!("nothing at {}", path);
    }
    println!();

    Ok(())
}

/// Print every property of `node` as `path/name = value`, then recurse
fn dump_node<'a>(
    tree: &DeviceTree<'a>,
    path: &str,
    node: Option<&Block<'a>>,
) -> Result<(), DtbError> {
    let mut props = tree.properties(node);
    while let Some(prop) = props.try_next()? {
        println!("{}/{} = {}", path, prop.name, format_value(&prop));
    }

    let mut children = tree.children(node);
    while let Some(child) = children.try_next()? {
        let child_path = format!("{}/{}", path, child.name);
        dump_node(tree, &child_path, Some(&child))?;
    }

    Ok(())
}

/// Strings when every byte is printable or NUL, `<0x...>` cells otherwise
fn format_value(prop: &Block) -> String {
    let printable = prop
        .data
        .iter()
        .all(|&b| b == 0 || b.is_ascii_graphic() || b == b' ');

    if printable && prop.data.last() == Some(&0) {
        let strings: Vec<String> = prop.strings().map(|s| format!("\"{}\"", s)).collect();
        strings.join(",")
    } else {
        let cells: Vec<String> = prop.words().map(|w| format!("0x{:08x}", w)).collect();
        format!("<{}>", cells.join(","))
    }
}
