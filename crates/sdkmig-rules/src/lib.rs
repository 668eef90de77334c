//! sdkmig-rules: AWS SDK for Java v1 → v2 migration rules
//!
//! Rules, in pipeline order:
//! - s3_unsupported_comments: Annotate S3 calls with no automatic v2 equivalent
//! - s3_uri_comments: Annotate AmazonS3URI usage
//! - exception_accessors: getErrorCode() → awsErrorDetails().errorCode() and friends
//! - method_renames: Table-driven method renames
//! - numeric_to_duration: setTimeout(1000) → timeout(Duration.ofMillis(1000))
//! - s3_object_stream: S3Object → ResponseInputStream<GetObjectResponse>
//! - change_sdk_type: v1 types and imports → v2
//! - client_builder_statics: AmazonS3ClientBuilder.standard() → S3Client.builder()
//! - s3_method_args: Positional S3 arguments → request objects
//! - transfer_manager_methods: TransferManager calls → S3TransferManager requests
//! - new_class_to_builder: new X().withA(a) → X.builder().a(a).build()
//! - new_class_to_static_factory: new AwsBasicCredentials(k, s) → AwsBasicCredentials.create(k, s)
//! - s3_put_object_payload: Request payloads → RequestBody arguments
//! - setter_to_builder: obj.setA(a) → obj = obj.toBuilder().a(a).build()
//! - getter_to_accessor: obj.getA() → obj.a()
//! - enum_casing: StorageClass.Standard → StorageClass.STANDARD
//! - http_settings_to_http_client: HTTP settings → httpClientBuilder(...)

pub mod comments;
pub mod context;
pub mod imports;
pub mod migrate;
pub mod naming;
pub mod patterns;
pub mod recipe;
pub mod registry;
pub mod resolve;
pub mod sdk_types;

pub mod change_sdk_type;
pub mod client_builder_statics;
pub mod enum_casing;
pub mod exception_accessors;
pub mod getter_to_accessor;
pub mod http_settings_to_http_client;
pub mod method_renames;
pub mod new_class_to_builder;
pub mod new_class_to_static_factory;
pub mod numeric_to_duration;
pub mod s3_method_args;
pub mod s3_object_stream;
pub mod s3_put_object_payload;
pub mod s3_unsupported_comments;
pub mod s3_uri_comments;
pub mod setter_to_builder;
pub mod transfer_manager_methods;

pub use enum_casing::v2_casing;
pub use migrate::{migrate_source, AppliedEdit, MigrationError, MigrationOutcome, MigrationSettings};
pub use naming::{TypeKind, TypeMapper, TypeMapping};
pub use recipe::RecipeTables;
pub use registry::{Category, ConfigError, Rule, RuleError, RuleRegistry};
