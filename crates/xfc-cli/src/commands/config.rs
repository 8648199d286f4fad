use anyhow::Result;
use xfc_core::Configuration;
use xfc_io::{load_configuration, render_configuration};

use xfc_cli::cli::ConfigCommands;

pub fn handle(command: &ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Default { format } => {
            let text = render_configuration(&Configuration::default(), (*format).into())?;
            print!("{text}");
            if !text.ends_with('\n') {
                println!();
            }
            Ok(())
        }
        ConfigCommands::Check { file } => {
            let config = load_configuration(file)?;
            println!("Configuration OK: {}", file.display());
            println!(
                "  xfmr2: ratio_phase={} shunt={} structural_ratio={} phase_negate={}",
                config.xfmr2.ratio_phase,
                config.xfmr2.shunt,
                config.xfmr2.structural_ratio,
                config.xfmr2.phase_negate
            );
            println!("  xfmr3: rated_uf={}", config.xfmr3.rated_uf);
            for (number, winding) in config.xfmr3.windings.iter().enumerate() {
                println!(
                    "    winding {}: ratio_phase_network_side={} shunt={} ratio0_at_star_bus={}",
                    number + 1,
                    winding.ratio_phase_network_side,
                    winding.shunt,
                    winding.ratio0_at_star_bus
                );
            }
            println!(
                "  phase_angle_clock_enabled={}",
                config.phase_angle_clock_enabled
            );
            Ok(())
        }
    }
}
