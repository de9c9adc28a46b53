//! Prints the Janusgraph CustomResourceDefinition as YAML.
//!
//! Usage: `cargo run -p crds --bin crdgen > config/crd/janusgraph.yaml`

use anyhow::Context;
use crds::Janusgraph;
use kube::CustomResourceExt;

fn main() -> anyhow::Result<()> {
    let crd = Janusgraph::crd();
    let yaml = serde_yaml::to_string(&crd).context("failed to serialize Janusgraph CRD")?;
    print!("{yaml}");
    Ok(())
}
