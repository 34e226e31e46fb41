//! Resolution of an environment snapshot into validated settings
//!
//! Every `PORT*` key is parsed on its own: a malformed key yields exactly
//! one error and never hides the mappings of its neighbours. The final
//! result is still all-or-nothing.

use super::mapping::parse_mapping;
use super::proxy::parse_proxy;
use super::schema::{PortMapping, ProxySpec, Settings};
use crate::env::Environment;
use crate::error::{ResolveError, ResolveErrors};

/// Prefix of every port mapping variable
pub const MAPPING_PREFIX: &str = "PORT";

/// Variable holding the optional SOCKS4A proxy
pub const PROXY_KEY: &str = "SOCKS_PROXY";

/// Parse every mapping variable, keeping successes and failures apart
pub fn collect_mappings(env: &Environment) -> (Vec<PortMapping>, Vec<ResolveError>) {
    env.with_prefix(MAPPING_PREFIX).fold(
        (Vec::new(), Vec::new()),
        |(mut mappings, mut errors), (key, value)| {
            match parse_mapping(value) {
                Ok(parsed) => mappings.extend(parsed),
                Err(source) => errors.push(ResolveError::Mapping {
                    key: key.to_string(),
                    value: value.to_string(),
                    source,
                }),
            }
            (mappings, errors)
        },
    )
}

/// Parse the proxy variable, if set
pub fn resolve_proxy(env: &Environment) -> Result<Option<ProxySpec>, ResolveError> {
    let value = env.get(PROXY_KEY).unwrap_or_default();
    parse_proxy(value).map_err(|source| ResolveError::Proxy {
        key: PROXY_KEY.to_string(),
        value: value.to_string(),
        source,
    })
}

/// Resolve the environment into settings, or every reason it can't be
pub fn resolve(env: &Environment) -> Result<Settings, ResolveErrors> {
    let (mappings, mut errors) = collect_mappings(env);
    if mappings.is_empty() && errors.is_empty() {
        errors.push(ResolveError::NoPorts);
    }

    let proxy = resolve_proxy(env).unwrap_or_else(|e| {
        errors.push(e);
        None
    });

    if !errors.is_empty() {
        return Err(ResolveErrors::new(errors));
    }

    tracing::debug!(
        "Resolved {} port mapping(s){}",
        mappings.len(),
        proxy
            .as_ref()
            .map(|p| format!(" via SOCKS4A proxy {p}"))
            .unwrap_or_default()
    );

    Ok(Settings { mappings, proxy })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{MappingError, PortSide, ProxySpecError};

    fn env(vars: &[(&str, &str)]) -> Environment {
        vars.iter().copied().collect()
    }

    fn messages(errors: ResolveErrors) -> Vec<String> {
        let mut messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
        messages.sort();
        messages
    }

    fn sorted(mut mappings: Vec<PortMapping>) -> Vec<PortMapping> {
        mappings.sort_by_key(|m| (m.local_port, m.remote_port));
        mappings
    }

    #[test]
    fn test_plain_mappings() {
        let settings = resolve(&env(&[
            ("PORT0", "9990:10.10.10.0:9090"),
            ("PORT1", "9991:10.10.10.1:9091"),
            ("PORT2", "10.10.10.2:9092"),
            ("port2", "localhost:9999"),
            ("bla", "localhost:9998"),
        ]))
        .unwrap();

        assert_eq!(settings.proxy, None);
        assert_eq!(
            sorted(settings.mappings),
            vec![
                PortMapping::new(9092, "10.10.10.2", 9092),
                PortMapping::new(9990, "10.10.10.0", 9090),
                PortMapping::new(9991, "10.10.10.1", 9091),
            ]
        );
    }

    #[test]
    fn test_every_bad_key_is_reported() {
        let errors = resolve(&env(&[
            ("PORT0", "9000:host1:9000"),
            ("PORT1", "9001"),
            ("PORT2", "host1:wololo"),
            ("PORT3", "foo:host1:9000"),
            ("PORT4", "8000:127.0.0.1"),
        ]))
        .unwrap_err();

        let messages = messages(errors);
        assert_eq!(messages.len(), 4);
        assert_eq!(
            messages[0],
            "invalid port mapping \"PORT1=9001\": should at least contain REMOTE_HOST:REMOTE_PORT"
        );
        assert!(messages[1].starts_with("invalid port mapping \"PORT2=host1:wololo\": invalid REMOTE port: "));
        assert!(messages[2].starts_with("invalid port mapping \"PORT3=foo:host1:9000\": invalid LOCAL port: "));
        assert!(messages[3].starts_with("invalid port mapping \"PORT4=8000:127.0.0.1\": invalid REMOTE port: "));
    }

    #[test]
    fn test_proxy() {
        let settings = resolve(&env(&[("PORT", "host1:9000"), ("SOCKS_PROXY", "tor:9050")])).unwrap();

        assert_eq!(settings.mappings, vec![PortMapping::new(9000, "host1", 9000)]);
        assert_eq!(
            settings.proxy,
            Some(ProxySpec {
                host: "tor".to_string(),
                port: 9050
            })
        );
    }

    #[test]
    fn test_bad_proxy_fails_resolution() {
        let errors = resolve(&env(&[("PORTS", "nginx:80"), ("SOCKS_PROXY", "9050")])).unwrap_err();

        let errors = errors.into_inner();
        assert_eq!(
            errors,
            vec![ResolveError::Proxy {
                key: "SOCKS_PROXY".to_string(),
                value: "9050".to_string(),
                source: ProxySpecError::Format,
            }]
        );
    }

    #[test]
    fn test_bad_proxy_and_no_ports() {
        let errors = resolve(&env(&[("SOCKS_PROXY", "nginx:foo")])).unwrap_err();

        let errors = errors.into_inner();
        assert_eq!(errors.len(), 2);
        assert!(errors.contains(&ResolveError::NoPorts));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ResolveError::Proxy { source: ProxySpecError::InvalidPort(_), .. })));
    }

    #[test]
    fn test_empty_environment() {
        let errors = resolve(&Environment::new()).unwrap_err();
        assert_eq!(errors.into_inner(), vec![ResolveError::NoPorts]);
    }

    #[test]
    fn test_empty_proxy_is_ignored() {
        let settings = resolve(&env(&[("PORT", "host1:9000"), ("SOCKS_PROXY", "")])).unwrap();
        assert_eq!(settings.proxy, None);
    }

    #[test]
    fn test_no_ports_only_without_parse_errors() {
        let errors = resolve(&env(&[("PORT1", "9001")])).unwrap_err();
        let errors = errors.into_inner();

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].key(), Some("PORT1"));
        assert_eq!(errors[0].value(), Some("9001"));
        assert!(!errors.contains(&ResolveError::NoPorts));
    }

    #[test]
    fn test_bad_key_does_not_hide_good_ones() {
        let current = env(&[
            ("PORTRNG1", "8000-8002:host1:9015-9017"),
            ("PORTRNGinv1", "localhost:7000-foo"),
            ("PORTRNG2", "host2:7000-7002"),
        ]);

        let (mappings, errors) = collect_mappings(&current);
        assert_eq!(
            sorted(mappings),
            vec![
                PortMapping::new(7000, "host2", 7000),
                PortMapping::new(7001, "host2", 7001),
                PortMapping::new(7002, "host2", 7002),
                PortMapping::new(8000, "host1", 9015),
                PortMapping::new(8001, "host1", 9016),
                PortMapping::new(8002, "host1", 9017),
            ]
        );
        assert_eq!(errors.len(), 1);
        assert!(errors[0]
            .to_string()
            .starts_with("invalid port mapping \"PORTRNGinv1=localhost:7000-foo\": could not parse REMOTE port range: "));

        // The aggregate still fails as a whole
        let errors = resolve(&current).unwrap_err();
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_range_errors() {
        let errors = resolve(&env(&[
            ("PORTRNG1", "localhost:7000-foo"),
            ("PORTRNG2", "7000-foo:localhost:7000-8000"),
            ("PORTRNG3", "7000-8000:localhost:7000-foo"),
            ("PORTRNG4", "7000-foo:localhost:7000-foo"),
            ("PORTRNG5", "7000-8000:localhost:7000-7500"),
            ("PORTRNG6", "7000-7500:localhost:7000-8000"),
            ("PORTRNG7", "7000-8000:localhost"),
        ]))
        .unwrap_err();

        let by_key = |key: &str| -> MappingError {
            errors
                .iter()
                .find_map(|e| match e {
                    ResolveError::Mapping { key: k, source, .. } if k == key => Some(source.clone()),
                    _ => None,
                })
                .unwrap()
        };

        assert_eq!(errors.len(), 7);
        assert!(matches!(by_key("PORTRNG1"), MappingError::InvalidRange { side: PortSide::Remote, .. }));
        assert!(matches!(by_key("PORTRNG2"), MappingError::InvalidRange { side: PortSide::Local, .. }));
        assert!(matches!(by_key("PORTRNG3"), MappingError::InvalidRange { side: PortSide::Remote, .. }));
        assert!(matches!(by_key("PORTRNG4"), MappingError::InvalidRange { side: PortSide::Remote, .. }));
        assert_eq!(by_key("PORTRNG5"), MappingError::LengthMismatch { local: 1001, remote: 501 });
        assert_eq!(by_key("PORTRNG6"), MappingError::LengthMismatch { local: 501, remote: 1001 });
        assert!(matches!(by_key("PORTRNG7"), MappingError::InvalidPort { side: PortSide::Remote, .. }));
    }

    #[test]
    fn test_single_local_port_ignored_for_remote_range() {
        let settings = resolve(&env(&[("PORTRNG", "8000:host:9000-9002")])).unwrap();
        assert_eq!(
            settings.mappings,
            vec![
                PortMapping::new(9000, "host", 9000),
                PortMapping::new(9001, "host", 9001),
                PortMapping::new(9002, "host", 9002),
            ]
        );
    }

    #[test]
    fn test_keys_keep_snapshot_order() {
        let (mappings, _) = collect_mappings(&env(&[("PORTB", "b:2"), ("PORTA", "a:1")]));
        let hosts: Vec<&str> = mappings.iter().map(|m| m.remote_host.as_str()).collect();
        assert_eq!(hosts, vec!["b", "a"]);
    }
}
