use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A fact about cats, shown in the console plugin next to a cat icon.
///
/// Both fields are optional on creation: the operator fills in an empty
/// `fact` from the fact API and picks a random `iconName` when none is given.
#[derive(
    CustomResource,
    Deserialize,
    Serialize,
    Clone,
    Debug,
    Default,
    PartialEq,
    Eq,
    JsonSchema,
)]
#[kube(
    group = "taco.moe",
    version = "v1alpha1",
    kind = "CatFact",
    plural = "catfacts",
    namespaced,
    status = "CatFactStatus",
    derive = "PartialEq"
)]
#[serde(rename_all = "camelCase")]
pub struct CatFactSpec {
    /// Fact text; empty means "fetch one for me"
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub fact: String,
    /// One of Grinning, Smiling, Joy, Hearts, Evil, Kissing, Weary, Crying, Pouting
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub icon_name: String,
}

#[derive(
    Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq, JsonSchema,
)]
pub struct CatFactStatus {}
