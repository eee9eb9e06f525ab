//! Inspect a radial light profile from the command line.
//!
//! Prints the derived rendering quantities (stepK, maxK, half-light
//! radius) for a chosen profile family, optionally shoots photons and
//! reports the realized statistics, and can dump the active accuracy
//! parameters as JSON.

use anyhow::Result;
use clap::{Parser, ValueEnum};
use rand::rngs::StdRng;
use rand::SeedableRng;

use profiles::{AccuracyParams, RadialProfile, SecondKick, Spergel};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Family {
    Spergel,
    SecondKick,
}

/// Command line arguments for the profile probe
#[derive(Parser, Debug)]
#[command(version, about = "Radial light-profile probe")]
struct Args {
    /// Profile family to inspect
    #[arg(long, value_enum, default_value_t = Family::Spergel)]
    family: Family,

    /// Spergel index ν
    #[arg(long, default_value_t = 0.5)]
    nu: f64,

    /// Second-kick critical frequency (1/r0 units)
    #[arg(long, default_value_t = 2.0)]
    kcrit: f64,

    /// Spergel scale radius
    #[arg(long, default_value_t = 1.0)]
    scale_radius: f64,

    /// Second-kick angular scale λ/r0
    #[arg(long, default_value_t = 1.0)]
    lam_over_r0: f64,

    /// Total flux
    #[arg(long, default_value_t = 1.0)]
    flux: f64,

    /// Shoot this many photons and report their statistics
    #[arg(long)]
    shoot: Option<usize>,

    /// Random seed for photon shooting
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Print the accuracy parameters as JSON and exit
    #[arg(long, default_value_t = false)]
    print_params: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let params = AccuracyParams::shared_default();

    if args.print_params {
        println!("{}", serde_json::to_string_pretty(params.as_ref())?);
        return Ok(());
    }

    match args.family {
        Family::Spergel => {
            let profile =
                Spergel::with_scale_radius(args.nu, args.scale_radius, args.flux, &params)?;
            println!("{profile}");
            println!("half-light radius: {:.6}", profile.half_light_radius()?);
            println!("stepK:             {:.6}", Spergel::step_k(&profile)?);
            println!("maxK:              {:.6}", Spergel::max_k(&profile));
            println!("peak brightness:   {:.6e}", profile.x_value(0.0, 0.0));
            report_shoot(&profile, &args)?;
        }
        Family::SecondKick => {
            let profile =
                SecondKick::new(args.lam_over_r0, args.kcrit, args.flux, &params)?;
            println!("{profile}");
            println!("half-light radius: {:.6}", profile.half_light_radius());
            println!("stepK:             {:.6}", SecondKick::step_k(&profile));
            println!("maxK:              {:.6}", SecondKick::max_k(&profile));
            println!("delta fraction:    {:.6}", profile.delta());
            println!("scattered flux:    {:.6}", profile.scattered_flux());
            report_shoot(&profile, &args)?;
        }
    }
    Ok(())
}

fn report_shoot<P: RadialProfile>(profile: &P, args: &Args) -> Result<()> {
    let Some(n) = args.shoot else {
        return Ok(());
    };
    let mut rng = StdRng::seed_from_u64(args.seed);
    let photons = profile.shoot_photons(n, &mut rng)?;
    println!("photons:           {}", photons.len());
    println!("realized flux:     {:.6}", photons.total_flux());
    println!("mean radius:       {:.6}", photons.mean_radius());
    Ok(())
}
