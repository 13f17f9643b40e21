use anyhow::Result;

use protogen_lib::compiler::{locate_compiler, locate_well_known_include};

use crate::project::ProjectArgs;

pub fn cmd_info(args: &ProjectArgs) -> Result<()> {
  let project = args.resolve()?;

  println!("Toolchain:");
  match &project.config_path {
    Some(path) => println!("Config: {}", path.display()),
    None => println!("Config: none"),
  }

  let compiler = match locate_compiler(project.compiler.as_deref()) {
    Ok(path) => {
      println!("Compiler: {}", path.display());
      path
    }
    Err(e) => {
      println!("Compiler: not found ({})", e);
      return Ok(());
    }
  };

  match locate_well_known_include(project.well_known_include.as_deref(), &compiler) {
    Ok(path) => println!("Well-known include: {}", path.display()),
    Err(e) => println!("Well-known include: not found ({})", e),
  }

  Ok(())
}
