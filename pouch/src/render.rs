//! Text rendering of packages for logs and the terminal.

use std::ops::ControlFlow;

use pouch_core::inventory::Package;

/// Slots rendered per row.
pub const SLOTS_PER_ROW: u32 = 5;

/// Renders every live slot followed by a `hint:empty_count` summary line.
#[must_use]
pub fn render(package: &Package) -> String {
    let mut out = String::new();

    let flow = package.for_each_slot(0, |id, slot| {
        if id > 0 && id % SLOTS_PER_ROW == 0 {
            out.push('\n');
        }
        out.push_str(&format!("slot: {id} -> {slot}\t"));
        ControlFlow::<()>::Continue(())
    });
    debug_assert!(flow.is_continue());

    let hint = package
        .empty_hint()
        .map_or_else(|| "-".to_string(), |hint| hint.to_string());
    out.push_str(&format!("\n{hint}:{}", package.empty_count()));
    out
}
