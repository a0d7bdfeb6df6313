//! # xds-types
//!
//! Envoy xDS wire types for the ferromesh control plane.
//!
//! This crate provides hand-maintained Rust mirrors of the xDS v3 protobuf
//! messages the delta protocol core exchanges with proxies, together with
//! the `AggregatedDiscoveryService` gRPC service definition. The message
//! structs carry the exact field tags of the upstream protos, so they are
//! wire-compatible with real Envoy clients; only the fields the control
//! plane inspects are mirrored (prost skips unknown fields on decode).

#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(missing_docs)] // Wire mirrors follow the proto comments, not rustdoc.

// Re-export prost types for convenience.
pub use prost::Message;
pub use prost_types::Any;

pub mod google {
    //! Google API types.

    pub mod rpc {
        //! gRPC status types.

        /// The `Status` type defines a logical error model suitable for
        /// different programming environments. Carried by NACKs in
        /// `error_detail`.
        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct Status {
            /// The status code.
            #[prost(int32, tag = "1")]
            pub code: i32,
            /// A developer-facing error message.
            #[prost(string, tag = "2")]
            pub message: ::prost::alloc::string::String,
            /// A list of messages that carry the error details.
            #[prost(message, repeated, tag = "3")]
            pub details: ::prost::alloc::vec::Vec<::prost_types::Any>,
        }
    }
}

pub mod envoy {
    //! Envoy xDS types.

    pub mod config {
        //! Envoy configuration types.

        pub mod core {
            //! Core configuration types.

            pub mod v3 {
                //! Core v3 API.

                /// Identifies a specific Envoy instance. Remote server
                /// behavior may vary on the node metadata.
                #[derive(Clone, PartialEq, ::prost::Message)]
                pub struct Node {
                    /// An opaque node identifier for the Envoy node.
                    #[prost(string, tag = "1")]
                    pub id: ::prost::alloc::string::String,
                    /// The local service cluster name where Envoy is running.
                    #[prost(string, tag = "2")]
                    pub cluster: ::prost::alloc::string::String,
                    /// Opaque metadata extending the node identifier.
                    #[prost(message, optional, tag = "3")]
                    pub metadata: ::core::option::Option<::prost_types::Struct>,
                    /// Locality specifying where the Envoy instance is running.
                    #[prost(message, optional, tag = "4")]
                    pub locality: ::core::option::Option<Locality>,
                    /// Free-form string that identifies the entity requesting
                    /// config, e.g. "envoy".
                    #[prost(string, tag = "6")]
                    pub user_agent_name: ::prost::alloc::string::String,
                    /// Client feature support list (reverse DNS names).
                    #[prost(string, repeated, tag = "10")]
                    pub client_features: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
                    #[prost(oneof = "node::UserAgentVersionType", tags = "7, 8")]
                    pub user_agent_version_type:
                        ::core::option::Option<node::UserAgentVersionType>,
                }

                /// Nested message and enum types in `Node`.
                pub mod node {
                    #[derive(Clone, PartialEq, ::prost::Oneof)]
                    pub enum UserAgentVersionType {
                        /// Free-form version of the entity requesting config,
                        /// e.g. "1.29.4".
                        #[prost(string, tag = "7")]
                        UserAgentVersion(::prost::alloc::string::String),
                        /// Structured version of the entity requesting config.
                        #[prost(message, tag = "8")]
                        UserAgentBuildVersion(super::BuildVersion),
                    }
                }

                /// Identifies location of where either Envoy runs or where
                /// upstream hosts run.
                #[derive(Clone, PartialEq, ::prost::Message)]
                pub struct Locality {
                    /// Region this zone belongs to.
                    #[prost(string, tag = "1")]
                    pub region: ::prost::alloc::string::String,
                    /// Availability zone.
                    #[prost(string, tag = "2")]
                    pub zone: ::prost::alloc::string::String,
                    /// Further subdivision within the zone.
                    #[prost(string, tag = "3")]
                    pub sub_zone: ::prost::alloc::string::String,
                }

                /// BuildVersion combines a semantic version with free-form
                /// build metadata.
                #[derive(Clone, PartialEq, ::prost::Message)]
                pub struct BuildVersion {
                    /// SemVer version of the entity.
                    #[prost(message, optional, tag = "1")]
                    pub version: ::core::option::Option<SemanticVersion>,
                    /// Free-form build information.
                    #[prost(message, optional, tag = "2")]
                    pub metadata: ::core::option::Option<::prost_types::Struct>,
                }

                /// Envoy uses SemVer (https://semver.org/).
                #[derive(Clone, Copy, PartialEq, ::prost::Message)]
                pub struct SemanticVersion {
                    /// Major version.
                    #[prost(uint32, tag = "1")]
                    pub major_number: u32,
                    /// Minor version.
                    #[prost(uint32, tag = "2")]
                    pub minor_number: u32,
                    /// Patch version.
                    #[prost(uint32, tag = "3")]
                    pub patch: u32,
                }

                /// Identifies a specific control plane instance.
                #[derive(Clone, PartialEq, ::prost::Message)]
                pub struct ControlPlane {
                    /// An opaque control plane identifier.
                    #[prost(string, tag = "1")]
                    pub identifier: ::prost::alloc::string::String,
                }
            }
        }

        pub mod listener {
            //! Listener configuration types.

            pub mod v3 {
                //! Listener v3 API.
                //!
                //! Decode-only mirrors: just enough of the Listener message to
                //! walk filter chains down to the RDS route configuration
                //! names a listener references.

                /// A listener, mirrored down to its filter chains.
                #[derive(Clone, PartialEq, ::prost::Message)]
                pub struct Listener {
                    /// The unique name by which this listener is known.
                    #[prost(string, tag = "1")]
                    pub name: ::prost::alloc::string::String,
                    /// Filter chains considered for incoming connections.
                    #[prost(message, repeated, tag = "3")]
                    pub filter_chains: ::prost::alloc::vec::Vec<FilterChain>,
                    /// Filter chain used when no other chain matches.
                    #[prost(message, optional, tag = "25")]
                    pub default_filter_chain: ::core::option::Option<FilterChain>,
                }

                /// A grouping of network filters.
                #[derive(Clone, PartialEq, ::prost::Message)]
                pub struct FilterChain {
                    /// The network filters making up the chain.
                    #[prost(message, repeated, tag = "3")]
                    pub filters: ::prost::alloc::vec::Vec<Filter>,
                    /// The unique name (or empty) of this filter chain.
                    #[prost(string, tag = "7")]
                    pub name: ::prost::alloc::string::String,
                }

                /// A single network filter within a chain.
                #[derive(Clone, PartialEq, ::prost::Message)]
                pub struct Filter {
                    /// The name of the filter to instantiate.
                    #[prost(string, tag = "1")]
                    pub name: ::prost::alloc::string::String,
                    /// Filter-specific typed configuration.
                    #[prost(message, optional, tag = "4")]
                    pub typed_config: ::core::option::Option<::prost_types::Any>,
                }
            }
        }
    }

    pub mod extensions {
        //! Envoy extension config types.

        pub mod filters {
            pub mod network {
                pub mod http_connection_manager {
                    pub mod v3 {
                        //! HTTP connection manager v3 API.
                        //!
                        //! Decode-only mirror covering the `route_specifier`
                        //! field that names an RDS route configuration.

                        /// Type URL of the HTTP connection manager filter
                        /// config.
                        pub const HTTP_CONNECTION_MANAGER_TYPE: &str =
                            "type.googleapis.com/envoy.extensions.filters.network.http_connection_manager.v3.HttpConnectionManager";

                        /// HTTP connection manager filter configuration.
                        #[derive(Clone, PartialEq, ::prost::Message)]
                        pub struct HttpConnectionManager {
                            /// The connection manager's route table is
                            /// dynamically loaded via RDS.
                            #[prost(message, optional, tag = "3")]
                            pub rds: ::core::option::Option<Rds>,
                        }

                        /// RDS configuration.
                        #[derive(Clone, PartialEq, ::prost::Message)]
                        pub struct Rds {
                            /// The name of the route configuration to fetch.
                            #[prost(string, tag = "2")]
                            pub route_config_name: ::prost::alloc::string::String,
                        }
                    }
                }
            }
        }
    }

    pub mod service {
        //! Envoy discovery service definitions.

        pub mod discovery {
            //! Core discovery service types.

            pub mod v3 {
                //! Discovery service v3 API.

                /// A DiscoveryRequest requests a set of versioned resources of
                /// the same type for a given Envoy node on some API.
                #[derive(Clone, PartialEq, ::prost::Message)]
                pub struct DiscoveryRequest {
                    /// Version info from the most recent successfully
                    /// processed response, or empty on the first request.
                    #[prost(string, tag = "1")]
                    pub version_info: ::prost::alloc::string::String,
                    /// The node making the request.
                    #[prost(message, optional, tag = "2")]
                    pub node:
                        ::core::option::Option<crate::envoy::config::core::v3::Node>,
                    /// List of resources to subscribe to.
                    #[prost(string, repeated, tag = "3")]
                    pub resource_names:
                        ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
                    /// Type of the resource being requested.
                    #[prost(string, tag = "4")]
                    pub type_url: ::prost::alloc::string::String,
                    /// Nonce of the DiscoveryResponse being ACK/NACKed.
                    #[prost(string, tag = "5")]
                    pub response_nonce: ::prost::alloc::string::String,
                    /// Populated when the previous response failed to apply.
                    #[prost(message, optional, tag = "6")]
                    pub error_detail: ::core::option::Option<crate::google::rpc::Status>,
                }

                /// A full-state discovery response.
                #[derive(Clone, PartialEq, ::prost::Message)]
                pub struct DiscoveryResponse {
                    /// The version of the response data.
                    #[prost(string, tag = "1")]
                    pub version_info: ::prost::alloc::string::String,
                    /// The response resources, typed per `type_url`.
                    #[prost(message, repeated, tag = "2")]
                    pub resources: ::prost::alloc::vec::Vec<::prost_types::Any>,
                    /// Canary marker.
                    #[prost(bool, tag = "3")]
                    pub canary: bool,
                    /// Type URL for the resources.
                    #[prost(string, tag = "4")]
                    pub type_url: ::prost::alloc::string::String,
                    /// Nonce for explicit ACKs.
                    #[prost(string, tag = "5")]
                    pub nonce: ::prost::alloc::string::String,
                    /// The control plane instance that sent the response.
                    #[prost(message, optional, tag = "6")]
                    pub control_plane: ::core::option::Option<
                        crate::envoy::config::core::v3::ControlPlane,
                    >,
                }

                /// An incremental discovery request.
                ///
                /// A DeltaDiscoveryRequest plays up to three independent
                /// roles: adjusting the tracked resource set via
                /// `resource_names_subscribe` / `resource_names_unsubscribe`,
                /// (N)ACKing an earlier response via `response_nonce` (with
                /// `error_detail` present making it a NACK), and - on the
                /// first message of a reconnected stream - declaring the
                /// resources the client already has via
                /// `initial_resource_versions`.
                #[derive(Clone, PartialEq, ::prost::Message)]
                pub struct DeltaDiscoveryRequest {
                    /// The node making the request.
                    #[prost(message, optional, tag = "1")]
                    pub node:
                        ::core::option::Option<crate::envoy::config::core::v3::Node>,
                    /// Type of the resource being requested.
                    #[prost(string, tag = "2")]
                    pub type_url: ::prost::alloc::string::String,
                    /// Resource names to add to the tracked set.
                    #[prost(string, repeated, tag = "3")]
                    pub resource_names_subscribe:
                        ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
                    /// Resource names to remove from the tracked set.
                    #[prost(string, repeated, tag = "4")]
                    pub resource_names_unsubscribe:
                        ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
                    /// Versions of the resources the client already holds,
                    /// keyed by resource name.
                    #[prost(map = "string, string", tag = "5")]
                    pub initial_resource_versions: ::std::collections::HashMap<
                        ::prost::alloc::string::String,
                        ::prost::alloc::string::String,
                    >,
                    /// Nonce of the DeltaDiscoveryResponse being ACK/NACKed,
                    /// otherwise omitted.
                    #[prost(string, tag = "6")]
                    pub response_nonce: ::prost::alloc::string::String,
                    /// Populated when the previous response failed to apply,
                    /// turning this request into a NACK.
                    #[prost(message, optional, tag = "7")]
                    pub error_detail: ::core::option::Option<crate::google::rpc::Status>,
                }

                /// An incremental discovery response carrying only changed
                /// resources plus explicit removals.
                #[derive(Clone, PartialEq, ::prost::Message)]
                pub struct DeltaDiscoveryResponse {
                    /// The version of the response data (debugging only).
                    #[prost(string, tag = "1")]
                    pub system_version_info: ::prost::alloc::string::String,
                    /// Upserted resources, typed per `type_url`.
                    #[prost(message, repeated, tag = "2")]
                    pub resources: ::prost::alloc::vec::Vec<Resource>,
                    /// Type URL for the resources.
                    #[prost(string, tag = "4")]
                    pub type_url: ::prost::alloc::string::String,
                    /// Names of resources the client should drop.
                    #[prost(string, repeated, tag = "6")]
                    pub removed_resources:
                        ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
                    /// Nonce the client uses to (N)ACK this response.
                    #[prost(string, tag = "5")]
                    pub nonce: ::prost::alloc::string::String,
                    /// The control plane instance that sent the response.
                    #[prost(message, optional, tag = "7")]
                    pub control_plane: ::core::option::Option<
                        crate::envoy::config::core::v3::ControlPlane,
                    >,
                }

                /// A versioned resource within a delta response.
                #[derive(Clone, PartialEq, ::prost::Message)]
                pub struct Resource {
                    /// The resource's name.
                    #[prost(string, tag = "3")]
                    pub name: ::prost::alloc::string::String,
                    /// Other names this resource goes by.
                    #[prost(string, repeated, tag = "4")]
                    pub aliases:
                        ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
                    /// The per-resource version.
                    #[prost(string, tag = "1")]
                    pub version: ::prost::alloc::string::String,
                    /// The resource being tracked.
                    #[prost(message, optional, tag = "2")]
                    pub resource: ::core::option::Option<::prost_types::Any>,
                    /// Time-to-live for the resource, if any.
                    #[prost(message, optional, tag = "6")]
                    pub ttl: ::core::option::Option<::prost_types::Duration>,
                    /// Cache control properties for the resource.
                    #[prost(message, optional, tag = "7")]
                    pub cache_control: ::core::option::Option<resource::CacheControl>,
                }

                /// Nested message and enum types in `Resource`.
                pub mod resource {
                    /// Cache control properties for the resource.
                    #[derive(Clone, Copy, PartialEq, ::prost::Message)]
                    pub struct CacheControl {
                        /// If true, xDS proxies may not cache this resource.
                        #[prost(bool, tag = "1")]
                        pub do_not_cache: bool,
                    }
                }

                /// Generated server implementations.
                pub mod aggregated_discovery_service_server {
                    #![allow(
                        unused_variables,
                        dead_code,
                        missing_docs,
                        clippy::let_unit_value
                    )]
                    use tonic::codegen::*;
                    /// Generated trait containing gRPC methods that should be
                    /// implemented for use with AggregatedDiscoveryServiceServer.
                    #[async_trait]
                    pub trait AggregatedDiscoveryService: Send + Sync + 'static {
                        /// Server streaming response type for the StreamAggregatedResources method.
                        type StreamAggregatedResourcesStream: tonic::codegen::tokio_stream::Stream<
                                Item = std::result::Result<super::DiscoveryResponse, tonic::Status>,
                            >
                            + Send
                            + 'static;
                        /// This is a gRPC-only API.
                        async fn stream_aggregated_resources(
                            &self,
                            request: tonic::Request<tonic::Streaming<super::DiscoveryRequest>>,
                        ) -> std::result::Result<
                            tonic::Response<Self::StreamAggregatedResourcesStream>,
                            tonic::Status,
                        >;
                        /// Server streaming response type for the DeltaAggregatedResources method.
                        type DeltaAggregatedResourcesStream: tonic::codegen::tokio_stream::Stream<
                                Item = std::result::Result<
                                    super::DeltaDiscoveryResponse,
                                    tonic::Status,
                                >,
                            >
                            + Send
                            + 'static;
                        async fn delta_aggregated_resources(
                            &self,
                            request: tonic::Request<
                                tonic::Streaming<super::DeltaDiscoveryRequest>,
                            >,
                        ) -> std::result::Result<
                            tonic::Response<Self::DeltaAggregatedResourcesStream>,
                            tonic::Status,
                        >;
                    }
                    /// ADS requests have the same structure as their singleton
                    /// xDS counterparts, but can multiplex many resource types
                    /// on a single stream.
                    #[derive(Debug)]
                    pub struct AggregatedDiscoveryServiceServer<T: AggregatedDiscoveryService> {
                        inner: _Inner<T>,
                        accept_compression_encodings: EnabledCompressionEncodings,
                        send_compression_encodings: EnabledCompressionEncodings,
                        max_decoding_message_size: Option<usize>,
                        max_encoding_message_size: Option<usize>,
                    }
                    struct _Inner<T>(Arc<T>);
                    impl<T: AggregatedDiscoveryService> AggregatedDiscoveryServiceServer<T> {
                        pub fn new(inner: T) -> Self {
                            Self::from_arc(Arc::new(inner))
                        }
                        pub fn from_arc(inner: Arc<T>) -> Self {
                            let inner = _Inner(inner);
                            Self {
                                inner,
                                accept_compression_encodings: Default::default(),
                                send_compression_encodings: Default::default(),
                                max_decoding_message_size: None,
                                max_encoding_message_size: None,
                            }
                        }
                        pub fn with_interceptor<F>(
                            inner: T,
                            interceptor: F,
                        ) -> InterceptedService<Self, F>
                        where
                            F: tonic::service::Interceptor,
                        {
                            InterceptedService::new(Self::new(inner), interceptor)
                        }
                        /// Enable decompressing requests with the given encoding.
                        #[must_use]
                        pub fn accept_compressed(mut self, encoding: CompressionEncoding) -> Self {
                            self.accept_compression_encodings.enable(encoding);
                            self
                        }
                        /// Compress responses with the given encoding, if the client supports it.
                        #[must_use]
                        pub fn send_compressed(mut self, encoding: CompressionEncoding) -> Self {
                            self.send_compression_encodings.enable(encoding);
                            self
                        }
                        /// Limits the maximum size of a decoded message.
                        ///
                        /// Default: `4MB`
                        #[must_use]
                        pub fn max_decoding_message_size(mut self, limit: usize) -> Self {
                            self.max_decoding_message_size = Some(limit);
                            self
                        }
                        /// Limits the maximum size of an encoded message.
                        ///
                        /// Default: `usize::MAX`
                        #[must_use]
                        pub fn max_encoding_message_size(mut self, limit: usize) -> Self {
                            self.max_encoding_message_size = Some(limit);
                            self
                        }
                    }
                    impl<T, B> tonic::codegen::Service<http::Request<B>>
                    for AggregatedDiscoveryServiceServer<T>
                    where
                        T: AggregatedDiscoveryService,
                        B: Body + Send + 'static,
                        B::Error: Into<StdError> + Send + 'static,
                    {
                        type Response = http::Response<tonic::body::BoxBody>;
                        type Error = std::convert::Infallible;
                        type Future = BoxFuture<Self::Response, Self::Error>;
                        fn poll_ready(
                            &mut self,
                            _cx: &mut Context<'_>,
                        ) -> Poll<std::result::Result<(), Self::Error>> {
                            Poll::Ready(Ok(()))
                        }
                        fn call(&mut self, req: http::Request<B>) -> Self::Future {
                            let inner = self.inner.clone();
                            match req.uri().path() {
                                "/envoy.service.discovery.v3.AggregatedDiscoveryService/StreamAggregatedResources" => {
                                    #[allow(non_camel_case_types)]
                                    struct StreamAggregatedResourcesSvc<T: AggregatedDiscoveryService>(
                                        pub Arc<T>,
                                    );
                                    impl<
                                        T: AggregatedDiscoveryService,
                                    > tonic::server::StreamingService<super::DiscoveryRequest>
                                    for StreamAggregatedResourcesSvc<T> {
                                        type Response = super::DiscoveryResponse;
                                        type ResponseStream = T::StreamAggregatedResourcesStream;
                                        type Future = BoxFuture<
                                            tonic::Response<Self::ResponseStream>,
                                            tonic::Status,
                                        >;
                                        fn call(
                                            &mut self,
                                            request: tonic::Request<
                                                tonic::Streaming<super::DiscoveryRequest>,
                                            >,
                                        ) -> Self::Future {
                                            let inner = Arc::clone(&self.0);
                                            let fut = async move {
                                                <T as AggregatedDiscoveryService>::stream_aggregated_resources(
                                                        &inner,
                                                        request,
                                                    )
                                                    .await
                                            };
                                            Box::pin(fut)
                                        }
                                    }
                                    let accept_compression_encodings = self.accept_compression_encodings;
                                    let send_compression_encodings = self.send_compression_encodings;
                                    let max_decoding_message_size = self.max_decoding_message_size;
                                    let max_encoding_message_size = self.max_encoding_message_size;
                                    let inner = self.inner.clone();
                                    let fut = async move {
                                        let inner = inner.0;
                                        let method = StreamAggregatedResourcesSvc(inner);
                                        let codec = tonic::codec::ProstCodec::default();
                                        let mut grpc = tonic::server::Grpc::new(codec)
                                            .apply_compression_config(
                                                accept_compression_encodings,
                                                send_compression_encodings,
                                            )
                                            .apply_max_message_size_config(
                                                max_decoding_message_size,
                                                max_encoding_message_size,
                                            );
                                        let res = grpc.streaming(method, req).await;
                                        Ok(res)
                                    };
                                    Box::pin(fut)
                                }
                                "/envoy.service.discovery.v3.AggregatedDiscoveryService/DeltaAggregatedResources" => {
                                    #[allow(non_camel_case_types)]
                                    struct DeltaAggregatedResourcesSvc<T: AggregatedDiscoveryService>(
                                        pub Arc<T>,
                                    );
                                    impl<
                                        T: AggregatedDiscoveryService,
                                    > tonic::server::StreamingService<super::DeltaDiscoveryRequest>
                                    for DeltaAggregatedResourcesSvc<T> {
                                        type Response = super::DeltaDiscoveryResponse;
                                        type ResponseStream = T::DeltaAggregatedResourcesStream;
                                        type Future = BoxFuture<
                                            tonic::Response<Self::ResponseStream>,
                                            tonic::Status,
                                        >;
                                        fn call(
                                            &mut self,
                                            request: tonic::Request<
                                                tonic::Streaming<super::DeltaDiscoveryRequest>,
                                            >,
                                        ) -> Self::Future {
                                            let inner = Arc::clone(&self.0);
                                            let fut = async move {
                                                <T as AggregatedDiscoveryService>::delta_aggregated_resources(
                                                        &inner,
                                                        request,
                                                    )
                                                    .await
                                            };
                                            Box::pin(fut)
                                        }
                                    }
                                    let accept_compression_encodings = self.accept_compression_encodings;
                                    let send_compression_encodings = self.send_compression_encodings;
                                    let max_decoding_message_size = self.max_decoding_message_size;
                                    let max_encoding_message_size = self.max_encoding_message_size;
                                    let inner = self.inner.clone();
                                    let fut = async move {
                                        let inner = inner.0;
                                        let method = DeltaAggregatedResourcesSvc(inner);
                                        let codec = tonic::codec::ProstCodec::default();
                                        let mut grpc = tonic::server::Grpc::new(codec)
                                            .apply_compression_config(
                                                accept_compression_encodings,
                                                send_compression_encodings,
                                            )
                                            .apply_max_message_size_config(
                                                max_decoding_message_size,
                                                max_encoding_message_size,
                                            );
                                        let res = grpc.streaming(method, req).await;
                                        Ok(res)
                                    };
                                    Box::pin(fut)
                                }
                                _ => {
                                    Box::pin(async move {
                                        Ok(
                                            http::Response::builder()
                                                .status(200)
                                                .header("grpc-status", "12")
                                                .header("content-type", "application/grpc")
                                                .body(empty_body())
                                                .unwrap(),
                                        )
                                    })
                                }
                            }
                        }
                    }
                    impl<T: AggregatedDiscoveryService> Clone
                    for AggregatedDiscoveryServiceServer<T> {
                        fn clone(&self) -> Self {
                            let inner = self.inner.clone();
                            Self {
                                inner,
                                accept_compression_encodings: self.accept_compression_encodings,
                                send_compression_encodings: self.send_compression_encodings,
                                max_decoding_message_size: self.max_decoding_message_size,
                                max_encoding_message_size: self.max_encoding_message_size,
                            }
                        }
                    }
                    impl<T: AggregatedDiscoveryService> Clone for _Inner<T> {
                        fn clone(&self) -> Self {
                            Self(Arc::clone(&self.0))
                        }
                    }
                    impl<T: std::fmt::Debug> std::fmt::Debug for _Inner<T> {
                        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                            write!(f, "{:?}", self.0)
                        }
                    }
                    impl<T: AggregatedDiscoveryService> tonic::server::NamedService
                    for AggregatedDiscoveryServiceServer<T> {
                        const NAME: &'static str = "envoy.service.discovery.v3.AggregatedDiscoveryService";
                    }
                }
            }
        }
    }
}
