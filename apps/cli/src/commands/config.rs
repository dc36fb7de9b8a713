use anyhow::Result;

use super::Context;
use crate::config::resolve_path;
use crate::output::print_json;

/// Print the effective configuration and where it was read from
pub fn run(ctx: &Context) -> Result<()> {
    let config = ctx.config()?;

    if ctx.json_output {
        return print_json(&config);
    }

    let path = resolve_path(ctx.config_path.as_deref())?;
    println!("Config file: {}\n", path.display());
    print!("{config}");
    Ok(())
}
