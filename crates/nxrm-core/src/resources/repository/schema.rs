// Attribute sets for each `{format, kind}` repository resource.

use serde_json::json;

use super::firewall;
use super::format::{Format, FormatBlock, RepositoryKind};
use crate::schema::Attribute;

pub const WRITE_POLICIES: &[&str] = &["ALLOW", "ALLOW_ONCE", "DENY"];
pub const HTTP_AUTH_TYPES: &[&str] = &["username", "ntlm", "bearerToken"];

fn storage(kind: RepositoryKind) -> Attribute {
    let mut attrs = vec![
        Attribute::string("blob_store_name")
            .required()
            .min_length(1)
            .description("Blob store holding this repository's content."),
        Attribute::bool("strict_content_type_validation")
            .default(true)
            .description("Validate that uploaded content matches its declared MIME type."),
    ];
    if kind == RepositoryKind::Hosted {
        attrs.push(
            Attribute::string("write_policy")
                .default("ALLOW_ONCE")
                .one_of(WRITE_POLICIES)
                .description("Whether deployments may create or redeploy components."),
        );
    }
    Attribute::object("storage", attrs).required()
}

fn cleanup() -> Attribute {
    Attribute::object(
        "cleanup",
        vec![
            Attribute::string_set("policy_names")
                .default(json!([]))
                .description("Cleanup policies applied to this repository."),
        ],
    )
}

fn component() -> Attribute {
    Attribute::object(
        "component",
        vec![Attribute::bool("proprietary_components").default(false)],
    )
}

fn proxy() -> Attribute {
    Attribute::object(
        "proxy",
        vec![
            Attribute::string("remote_url")
                .required()
                .min_length(1)
                .description("Location of the remote repository being proxied."),
            Attribute::int64("content_max_age")
                .default(1440)
                .at_least(-1)
                .description("Minutes to cache artifacts; -1 caches forever."),
            Attribute::int64("metadata_max_age")
                .default(1440)
                .at_least(-1)
                .description("Minutes to cache metadata; -1 caches forever."),
        ],
    )
    .required()
}

fn negative_cache() -> Attribute {
    Attribute::object(
        "negative_cache",
        vec![
            Attribute::bool("enabled").default(true),
            Attribute::int64("time_to_live")
                .default(1440)
                .at_least(0)
                .description("Minutes to cache a not-found response."),
        ],
    )
    .required()
}

fn http_client() -> Attribute {
    Attribute::object(
        "http_client",
        vec![
            Attribute::bool("blocked").default(false),
            Attribute::bool("auto_block")
                .default(true)
                .description("Block the remote automatically while it is unreachable."),
            Attribute::object(
                "connection",
                vec![
                    Attribute::int64("retries").range(0, 10),
                    Attribute::string("user_agent_suffix"),
                    Attribute::int64("timeout")
                        .range(1, 3600)
                        .description("Seconds."),
                    Attribute::bool("enable_circular_redirects"),
                    Attribute::bool("enable_cookies"),
                    Attribute::bool("use_trust_store"),
                ],
            ),
            Attribute::object(
                "authentication",
                vec![
                    Attribute::string("type").required().one_of(HTTP_AUTH_TYPES),
                    Attribute::string("username"),
                    Attribute::string("password").write_only(),
                    Attribute::string("ntlm_host"),
                    Attribute::string("ntlm_domain"),
                    Attribute::bool("preemptive"),
                    Attribute::string("bearer_token").write_only(),
                ],
            ),
        ],
    )
    .required()
}

fn replication() -> Attribute {
    Attribute::object(
        "replication",
        vec![
            Attribute::bool("preemptive_pull_enabled").default(false),
            Attribute::string("asset_path_regex"),
        ],
    )
}

fn group() -> Attribute {
    Attribute::object(
        "group",
        vec![
            Attribute::string_list("member_names")
                .required()
                .description("Member repositories, searched in this order."),
            Attribute::string("writable_member")
                .description("Member that receives deployments made through the group."),
        ],
    )
    .required()
}

fn signing(name: &'static str, required: bool) -> Attribute {
    let keypair = Attribute::string("keypair").description("ASCII-armoured PGP signing key pair.");
    let block = Attribute::object(
        name,
        vec![
            if required { keypair.required() } else { keypair },
            Attribute::string("passphrase").write_only(),
        ],
    );
    if required { block.required() } else { block }
}

fn format_block(block: FormatBlock, kind: RepositoryKind) -> Attribute {
    match block {
        FormatBlock::Maven => Attribute::object(
            "maven",
            vec![
                Attribute::string("version_policy")
                    .default("RELEASE")
                    .one_of(&["RELEASE", "SNAPSHOT", "MIXED"]),
                Attribute::string("layout_policy")
                    .default("STRICT")
                    .one_of(&["STRICT", "PERMISSIVE"]),
                Attribute::string("content_disposition")
                    .default("INLINE")
                    .one_of(&["INLINE", "ATTACHMENT"]),
            ],
        )
        .required(),
        FormatBlock::Docker => Attribute::object(
            "docker",
            vec![
                Attribute::bool("v1_enabled").default(false),
                Attribute::bool("force_basic_auth").default(true),
                Attribute::int64("http_port").range(1, 65535),
                Attribute::int64("https_port").range(1, 65535),
                Attribute::string("subdomain"),
                Attribute::bool("path_enabled"),
            ],
        )
        .required(),
        FormatBlock::DockerProxy => Attribute::object(
            "docker_proxy",
            vec![
                Attribute::string("index_type")
                    .required()
                    .one_of(&["REGISTRY", "HUB", "CUSTOM"]),
                Attribute::string("index_url"),
                Attribute::bool("cache_foreign_layers"),
                Attribute::string_list("foreign_layer_url_whitelist").default(json!([])),
            ],
        )
        .required(),
        FormatBlock::Apt => {
            let mut attrs = vec![
                Attribute::string("distribution")
                    .required()
                    .min_length(1)
                    .description("Distribution to fetch or serve, e.g. bionic."),
            ];
            if kind == RepositoryKind::Proxy {
                attrs.push(Attribute::bool("flat").default(false));
            }
            Attribute::object("apt", attrs).required()
        }
        FormatBlock::AptSigning => signing("apt_signing", true),
        FormatBlock::Yum => Attribute::object(
            "yum",
            vec![
                Attribute::int64("repodata_depth").default(0).range(0, 5),
                Attribute::string("deploy_policy")
                    .default("STRICT")
                    .one_of(&["STRICT", "PERMISSIVE"]),
            ],
        )
        .required(),
        FormatBlock::YumSigning => signing("yum_signing", false),
        FormatBlock::NugetProxy => Attribute::object(
            "nuget_proxy",
            vec![
                Attribute::int64("query_cache_item_max_age")
                    .default(3600)
                    .at_least(0),
                Attribute::string("nuget_version")
                    .default("V3")
                    .one_of(&["V2", "V3"]),
            ],
        )
        .required(),
        FormatBlock::Npm => quarantine("npm"),
        FormatBlock::Pypi => quarantine("pypi"),
        FormatBlock::Raw => Attribute::object(
            "raw",
            vec![
                Attribute::string("content_disposition")
                    .default("ATTACHMENT")
                    .one_of(&["INLINE", "ATTACHMENT"]),
            ],
        ),
        FormatBlock::ConanProxy => Attribute::object(
            "conan_proxy",
            vec![Attribute::string("conan_version").one_of(&["V1", "V2"])],
        ),
    }
}

fn quarantine(name: &'static str) -> Attribute {
    Attribute::object(
        name,
        vec![
            Attribute::bool("remove_quarantined")
                .default(false)
                .description("Remove quarantined versions from metadata."),
        ],
    )
}

pub(crate) fn attributes(format: Format, kind: RepositoryKind) -> Vec<Attribute> {
    let mut attrs = vec![
        Attribute::string("name")
            .required()
            .min_length(1)
            .requires_replace()
            .description("Repository name; also the last segment of its URL."),
        Attribute::bool("online").default(true),
        Attribute::string("url")
            .computed()
            .use_state_for_unknown()
            .description("URL clients use to reach the repository."),
        storage(kind),
    ];
    match kind {
        RepositoryKind::Hosted => {
            attrs.push(cleanup());
            attrs.push(component());
        }
        RepositoryKind::Proxy => {
            attrs.push(cleanup());
            attrs.push(proxy());
            attrs.push(negative_cache());
            attrs.push(http_client());
            attrs.push(Attribute::string("routing_rule").description("Routing rule name."));
            attrs.push(replication());
            attrs.push(firewall::attribute());
        }
        RepositoryKind::Group => attrs.push(group()),
    }
    attrs.extend(format.blocks(kind).iter().map(|b| format_block(*b, kind)));
    attrs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(format: Format, kind: RepositoryKind) -> Vec<&'static str> {
        attributes(format, kind).iter().map(|a| a.name).collect()
    }

    #[test]
    fn proxy_envelope_has_remote_blocks() {
        let n = names(Format::Npm, RepositoryKind::Proxy);
        for expected in ["proxy", "negative_cache", "http_client", "repository_firewall", "npm"] {
            assert!(n.contains(&expected), "missing {expected}");
        }
        assert!(!n.contains(&"group"));
    }

    #[test]
    fn group_has_no_cleanup() {
        let n = names(Format::Maven, RepositoryKind::Group);
        assert!(n.contains(&"group"));
        assert!(!n.contains(&"cleanup"));
        assert!(!n.contains(&"maven"));
    }
}
