#![forbid(unsafe_code)]

//! Solna CLI: validate SAML responses, decrypt assertions, fingerprint certificates.

use clap::{Parser, Subcommand};
use solna::{Error, Response, ResponseOptions, Settings};
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

#[derive(Parser)]
#[command(
    name = "solna",
    about = "Solna: SAML 2.0 Response validation for service providers",
    version
)]
struct Cli {
    /// Debug logging (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a SAMLResponse (XML or base64) and print its claims
    Validate {
        /// Response file
        file: PathBuf,

        /// Settings file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// IdP signing certificate (PEM or base64 DER)
        #[arg(long = "idp-cert")]
        idp_cert: Option<PathBuf>,

        /// IdP certificate SHA-1 fingerprint
        #[arg(long)]
        fingerprint: Option<String>,

        /// SP private key for encrypted assertions
        #[arg(short = 'k', long = "private-key")]
        private_key: Option<PathBuf>,

        /// Password of an encrypted private key
        #[arg(long)]
        password: Option<String>,

        /// Do not check the Conditions time window
        #[arg(long = "skip-conditions")]
        skip_conditions: bool,

        /// Allowed clock drift in seconds (NotBefore only)
        #[arg(long = "clock-drift")]
        clock_drift: Option<f64>,
    },

    /// Print the SHA-1 fingerprint and subject of a certificate
    Fingerprint {
        /// Certificate file (PEM, base64 or binary DER)
        cert: PathBuf,
    },

    /// Decrypt an encrypted response and print the assembled document
    Decrypt {
        /// Response file
        file: PathBuf,

        /// SP private key
        #[arg(short = 'k', long = "private-key")]
        private_key: PathBuf,

        /// Password of an encrypted private key
        #[arg(long)]
        password: Option<String>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List supported algorithms and key formats
    Info,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Validate {
            file,
            config,
            idp_cert,
            fingerprint,
            private_key,
            password,
            skip_conditions,
            clock_drift,
        } => cmd_validate(
            &file,
            config.as_deref(),
            TrustArgs {
                idp_cert,
                fingerprint,
                private_key,
                password,
            },
            skip_conditions,
            clock_drift,
        ),
        Commands::Fingerprint { cert } => cmd_fingerprint(&cert),
        Commands::Decrypt {
            file,
            private_key,
            password,
            output,
        } => cmd_decrypt(&file, private_key, password, output),
        Commands::Info => cmd_info(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Trust material given on the command line; overrides the settings file.
struct TrustArgs {
    idp_cert: Option<PathBuf>,
    fingerprint: Option<String>,
    private_key: Option<PathBuf>,
    password: Option<String>,
}

fn build_settings(config: Option<&Path>, args: TrustArgs) -> Result<Settings, Error> {
    let mut settings = match config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    if let Some(path) = args.idp_cert {
        settings.idp_cert = Some(read_file(&path)?);
    }
    if let Some(fingerprint) = args.fingerprint {
        settings.idp_cert_fingerprint = Some(fingerprint);
    }
    if let Some(path) = args.private_key {
        settings.private_key = Some(read_file(&path)?);
    }
    if args.password.is_some() {
        settings.private_key_password = args.password;
    }
    Ok(settings)
}

fn cmd_validate(
    file: &Path,
    config: Option<&Path>,
    trust: TrustArgs,
    skip_conditions: bool,
    clock_drift: Option<f64>,
) -> Result<(), Error> {
    let input = read_file(file)?;
    let settings = build_settings(config, trust)?;

    let mut options = match config {
        Some(path) => ResponseOptions::load(path)?,
        None => ResponseOptions::default(),
    };
    if skip_conditions {
        options = options.with_skip_conditions(true);
    }
    if let Some(secs) = clock_drift {
        let drift = Duration::try_from_secs_f64(secs)
            .map_err(|e| Error::InvalidArgument(format!("--clock-drift: {e}")))?;
        options = options.with_allowed_clock_drift(drift);
    }

    tracing::debug!(file = %file.display(), "validating");
    let response = Response::with_settings(input.trim(), options, &settings)?;
    match response.validate() {
        Ok(true) => {
            println!("OK");
            print_claims(&response);
            Ok(())
        }
        Ok(false) => {
            eprintln!(
                "INVALID: status {}",
                response.status_code().unwrap_or("(missing)")
            );
            process::exit(1);
        }
        Err(e) => {
            eprintln!("INVALID: {e}");
            process::exit(1);
        }
    }
}

fn print_claims(response: &Response<'_>) {
    println!("issuer:        {}", response.issuer().unwrap_or("-"));
    println!("name_id:       {}", response.name_id().unwrap_or("-"));
    println!("session_index: {}", response.session_index().unwrap_or("-"));
    if let Some(at) = response.session_expires_at() {
        println!("session_until: {}", solna::time::format_timestamp(at));
    }
    if response.is_encrypted() {
        println!("encrypted:     yes");
    }
    for (name, value) in response.attributes().iter() {
        println!("attribute {name}: {}", value.values().join(", "));
    }
}

fn cmd_fingerprint(cert: &Path) -> Result<(), Error> {
    let cert = solna::keys::loader::load_certificate_file(cert)?;
    let (not_before, not_after) = cert.validity();
    println!("{}", cert.fingerprint_sha1());
    println!("subject:    {}", cert.subject());
    println!("issuer:     {}", cert.issuer());
    println!("not before: {not_before}");
    println!("not after:  {not_after}");
    Ok(())
}

fn cmd_decrypt(
    file: &Path,
    private_key: PathBuf,
    password: Option<String>,
    output: Option<PathBuf>,
) -> Result<(), Error> {
    let input = read_file(file)?;
    let settings = Settings {
        private_key: Some(read_file(&private_key)?),
        private_key_password: password,
        ..Settings::default()
    };
    let response = Response::with_settings(input.trim(), ResponseOptions::default(), &settings)?;
    if !response.is_encrypted() {
        return Err(Error::InvalidArgument(format!(
            "{}: no EncryptedAssertion in response",
            file.display()
        )));
    }
    let decoded = response.decoded_response()?;
    write_output(output, decoded.as_bytes())
}

fn cmd_info() -> Result<(), Error> {
    println!("Solna: SAML 2.0 Response validation");
    for (category, uris) in solna::crypto::registry::SUPPORTED {
        println!();
        println!("{category}:");
        for uri in *uris {
            println!("  {uri}");
        }
    }
    println!();
    println!("Canonicalization:");
    println!("  {}", solna::core::algorithm::EXC_C14N);
    println!("  {}", solna::core::algorithm::EXC_C14N_WITH_COMMENTS);
    println!();
    println!("Key formats:");
    println!("  PKCS#8 / PKCS#1 PEM, encrypted PKCS#8 PEM, DER; X.509 PEM or base64 DER");
    Ok(())
}

fn read_file(path: &Path) -> Result<String, Error> {
    std::fs::read_to_string(path).map_err(|e| Error::Config(format!("{}: {e}", path.display())))
}

fn write_output(path: Option<PathBuf>, data: &[u8]) -> Result<(), Error> {
    match path {
        Some(p) => std::fs::write(&p, data).map_err(|e| Error::Config(format!("{}: {e}", p.display()))),
        None => {
            use std::io::Write;
            std::io::stdout()
                .write_all(data)
                .map_err(|e| Error::Config(format!("stdout: {e}")))
        }
    }
}
