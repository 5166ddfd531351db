use catfact_operator::crd::CatFact;
use kube::core::CustomResourceExt;

fn main() -> anyhow::Result<()> {
    let crd = CatFact::crd();
    let yaml = serde_yaml::to_string(&crd)?;
    println!("{}", yaml);
    Ok(())
}
