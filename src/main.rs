use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::{Value, json};
use tracing_subscriber::EnvFilter;

use canopy_bridge::{MountSlot, SlotView};
use canopy_config::HostConfig;
use canopy_host::HostProviders;
use canopy_loader::{FsBundleLoader, HttpBundleLoader, StandardBundleLoader};
use canopy_router::HostRouter;

mod demo;

/// How long `mount` waits for a slot to settle or catch up with navigation.
const SETTLE_TIMEOUT: Duration = Duration::from_secs(30);

/// Canopy - a host shell for independently built micro-apps
#[derive(Parser)]
#[command(name = "canopy")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Path to the data directory (default: ~/.canopy)
  #[arg(long, global = true)]
  data_dir: Option<PathBuf>,

  /// Path to the host config file (default: <data-dir>/canopy.json)
  #[arg(long, global = true)]
  config: Option<PathBuf>,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// List the configured micro-apps
  List,

  /// Mount micro-apps side by side and print what each slot shows
  Mount {
    /// Slugs to mount, one slot each
    #[arg(required = true)]
    slugs: Vec<String>,

    /// Paths to navigate to after mounting, in order
    #[arg(long)]
    navigate: Vec<String>,

    /// Include raw error detail in failed slots
    #[arg(long)]
    detail: bool,
  },
}

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();

  let data_dir = match cli.data_dir {
    Some(dir) => dir,
    None => dirs::home_dir()
      .context("could not determine home directory")?
      .join(".canopy"),
  };
  let config_path = cli
    .config
    .unwrap_or_else(|| data_dir.join("canopy.json"));

  match cli.command {
    Some(Commands::List) => list(&config_path, &data_dir)?,
    Some(Commands::Mount {
      slugs,
      navigate,
      detail,
    }) => {
      let rt = tokio::runtime::Runtime::new()?;
      rt.block_on(mount(&config_path, &data_dir, slugs, navigate, detail))?;
    }
    None => {
      println!("canopy - use --help to see available commands");
    }
  }

  Ok(())
}

fn load_config(config_path: &Path, data_dir: &Path) -> Result<HostConfig> {
  let content = std::fs::read_to_string(config_path)
    .with_context(|| format!("failed to read config file: {}", config_path.display()))?;
  let mut config = HostConfig::from_json(&content)
    .with_context(|| format!("failed to parse config file: {}", config_path.display()))?;

  let session_path = config
    .session_path
    .take()
    .unwrap_or_else(|| PathBuf::from("session.json"));
  config.session_path = Some(data_dir.join(session_path));
  Ok(config)
}

fn list(config_path: &Path, data_dir: &Path) -> Result<()> {
  let config = load_config(config_path, data_dir)?;
  if config.micro_apps.is_empty() {
    println!("no micro-apps configured");
    return Ok(());
  }
  for app in &config.micro_apps {
    println!("{}\t<{}>\t{}", app.slug, app.html_tag, app.bundle);
  }
  Ok(())
}

async fn mount(
  config_path: &Path,
  data_dir: &Path,
  slugs: Vec<String>,
  navigate: Vec<String>,
  detail: bool,
) -> Result<()> {
  let config = load_config(config_path, data_dir)?;
  eprintln!("Loaded {} micro-app(s)", config.micro_apps.len());

  let catalog = Arc::new(demo::catalog());
  let loader = StandardBundleLoader::new(
    FsBundleLoader::new(data_dir.join("bundles"), catalog.clone()),
    HttpBundleLoader::new(catalog),
  );

  let host = HostProviders::new(config, Arc::new(loader))
    .start()
    .await
    .context("failed to start host")?;

  let slots: Vec<MountSlot> = slugs
    .iter()
    .enumerate()
    .map(|(i, slug)| host.mount(format!("slot-{}", i), slug.as_str()))
    .collect();

  for slot in &slots {
    tokio::time::timeout(SETTLE_TIMEOUT, slot.settled())
      .await
      .with_context(|| format!("micro-app '{}' did not settle", slot.slug()))?;
  }
  print_views(&slots, detail)?;

  for path in &navigate {
    host.navigate(path);
    let location = host.router().location();
    for slot in &slots {
      if !wait_for_location(slot, &location.pathname, SETTLE_TIMEOUT).await {
        eprintln!(
          "Slot {} ({}) did not reach {} within {:?}",
          slot.id(),
          slot.slug(),
          location.pathname,
          SETTLE_TIMEOUT
        );
      }
    }
    eprintln!("Navigated to {}", location);
    print_views(&slots, detail)?;
  }

  host.shutdown().await;
  Ok(())
}

/// Wait until a mounted slot has been handed `pathname`. Slots that are not
/// mounted never receive context and count as caught up. Returns false if
/// `timeout` elapses first.
async fn wait_for_location(slot: &MountSlot, pathname: &str, timeout: Duration) -> bool {
  if !slot.phase().is_mounted() {
    return true;
  }
  let caught_up = || {
    slot
      .context()
      .and_then(|c| c.routing)
      .is_some_and(|r| r.location.pathname == pathname)
  };
  tokio::time::timeout(timeout, async {
    while !caught_up() {
      tokio::time::sleep(Duration::from_millis(10)).await;
    }
  })
  .await
  .is_ok()
}

fn print_views(slots: &[MountSlot], detail: bool) -> Result<()> {
  let output: Vec<Value> = slots
    .iter()
    .map(|slot| {
      json!({
        "slot": slot.id(),
        "slug": slot.slug(),
        "phase": slot.phase().name(),
        "view": view_json(slot.view(), detail),
      })
    })
    .collect();
  println!("{}", serde_json::to_string_pretty(&output)?);
  Ok(())
}

fn view_json(view: SlotView, detail: bool) -> Value {
  match view {
    SlotView::Idle => json!({ "kind": "idle" }),
    SlotView::Loading { slug } => json!({ "kind": "loading", "slug": slug }),
    SlotView::Shared { tag, content } => json!({ "kind": "shared", "tag": tag, "content": content }),
    SlotView::Isolated { tag } => json!({ "kind": "isolated", "tag": tag }),
    SlotView::Error(panel) => json!({
      "kind": "error",
      "error": panel.kind,
      "text": panel.render(detail),
    }),
  }
}
