//! Prints the AppPlatform custom resource definition as YAML.
//!
//! Used to generate the CRD manifest shipped with the operator:
//! `cargo run --bin crdgen > deploy/crd.yaml`

use kube::core::CustomResourceExt;
use platform_operator::crd::AppPlatform;

fn main() {
    print!(
        "{}",
        serde_yaml::to_string(&AppPlatform::crd()).expect("CRD serializes")
    );
}
