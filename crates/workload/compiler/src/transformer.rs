//! Request transformers.
//!
//! A transformer turns the [`RequestKind`] of one sampler family into the
//! engine-neutral [`SamplerSpec`] of a request node. Transformers are held by
//! a [`RequestTransformers`] registry keyed by [`RequestKindTag`] which the
//! caller builds and passes to the compiler; a request whose tag has no
//! registered transformer fails lowering with `UnknownRequestType`.

use crate::error::{CompilerError, CompilerResult};
use crate::types::SamplerSpec;
use std::collections::HashMap;
use workload_types::{Request, RequestKind, RequestKindTag};

// ── Transformer Trait ────────────────────────────────────────────────

/// Trait for lowering one sampler family.
pub trait RequestTransformer: Send + Sync {
    /// The sampler family this transformer handles.
    fn kind(&self) -> RequestKindTag;

    /// Produce the sampler settings of a request.
    fn transform(&self, request: &Request) -> CompilerResult<SamplerSpec>;
}

// ── Built-in Transformer ─────────────────────────────────────────────

/// Transformer for the sampler families known to the plan format.
#[derive(Clone, Debug)]
pub struct BuiltinRequestTransformer {
    kind: RequestKindTag,
}

impl BuiltinRequestTransformer {
    pub fn new(kind: RequestKindTag) -> Self {
        Self { kind }
    }

    /// One transformer per built-in sampler family.
    pub fn all() -> Vec<Self> {
        [
            RequestKindTag::Http,
            RequestKindTag::Java,
            RequestKindTag::BeanShell,
            RequestKindTag::JUnit,
            RequestKindTag::Soap,
        ]
        .into_iter()
        .map(Self::new)
        .collect()
    }
}

impl RequestTransformer for BuiltinRequestTransformer {
    fn kind(&self) -> RequestKindTag {
        self.kind.clone()
    }

    fn transform(&self, request: &Request) -> CompilerResult<SamplerSpec> {
        let tag = request.kind.tag();
        if tag != self.kind {
            return Err(CompilerError::UnknownRequestType {
                request: request.id.clone(),
                kind: tag,
            });
        }

        let sampler = match &request.kind {
            RequestKind::Http {
                method,
                protocol,
                domain,
                port,
                path,
                parameters,
            } => SamplerSpec::Http {
                method: *method,
                protocol: protocol.clone(),
                domain: domain.clone(),
                port: *port,
                path: path.clone(),
                arguments: parameters.clone(),
            },
            RequestKind::Java {
                class_name,
                arguments,
            } => SamplerSpec::Java {
                class_name: class_name.clone(),
                arguments: arguments.clone(),
            },
            RequestKind::BeanShell { script, parameters } => SamplerSpec::BeanShell {
                script: script.clone(),
                parameters: parameters.join(" "),
            },
            RequestKind::JUnit { class_name, method } => SamplerSpec::JUnit {
                class_name: class_name.clone(),
                method: method.clone(),
            },
            RequestKind::Soap {
                url,
                soap_action,
                envelope,
            } => {
                if url.is_empty() {
                    return Err(CompilerError::InvalidRequest {
                        request: request.id.clone(),
                        reason: "SOAP request without endpoint URL".into(),
                    });
                }
                SamplerSpec::Soap {
                    url: url.clone(),
                    soap_action: soap_action.clone(),
                    envelope: envelope.clone(),
                }
            }
            RequestKind::Extension { .. } => {
                return Err(CompilerError::UnknownRequestType {
                    request: request.id.clone(),
                    kind: tag,
                })
            }
        };
        Ok(sampler)
    }
}

// ── Registry ─────────────────────────────────────────────────────────

/// Transformers keyed by sampler family.
pub struct RequestTransformers {
    transformers: HashMap<RequestKindTag, Box<dyn RequestTransformer>>,
}

impl RequestTransformers {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            transformers: HashMap::new(),
        }
    }

    /// A registry with every built-in sampler family.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for transformer in BuiltinRequestTransformer::all() {
            registry.register(Box::new(transformer));
        }
        registry
    }

    /// Register a transformer, replacing any previous one for its family.
    pub fn register(&mut self, transformer: Box<dyn RequestTransformer>) {
        self.transformers.insert(transformer.kind(), transformer);
    }

    pub fn with(mut self, transformer: Box<dyn RequestTransformer>) -> Self {
        self.register(transformer);
        self
    }

    pub fn get(&self, kind: &RequestKindTag) -> Option<&dyn RequestTransformer> {
        self.transformers.get(kind).map(|t| t.as_ref())
    }

    pub fn contains(&self, kind: &RequestKindTag) -> bool {
        self.transformers.contains_key(kind)
    }

    pub fn len(&self) -> usize {
        self.transformers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transformers.is_empty()
    }

    /// Transform a request with the transformer registered for its family.
    pub fn transform(&self, request: &Request) -> CompilerResult<SamplerSpec> {
        let kind = request.kind.tag();
        let transformer = self
            .get(&kind)
            .ok_or_else(|| CompilerError::UnknownRequestType {
                request: request.id.clone(),
                kind,
            })?;
        transformer.transform(request)
    }
}

impl Default for RequestTransformers {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl std::fmt::Debug for RequestTransformers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut kinds: Vec<_> = self.transformers.keys().collect();
        kinds.sort();
        f.debug_struct("RequestTransformers")
            .field("kinds", &kinds)
            .finish()
    }
}
