use anyhow::Result;
use pretty_assertions::assert_eq;

use crate::CliTest;

const USER_MODEL: &str = "import Model, { attr, belongsTo } from '@ember-data/model';\n\
\n\
export default class User extends Model {\n\
\x20 @attr('string') declare name: string;\n\
\x20 @attr('string') declare email: string;\n\
\x20 @belongsTo('company', { async: false }) declare company;\n\
\n\
\x20 get displayName() {\n\
\x20   return `${this.name}`;\n\
\x20 }\n\
}\n";

#[test]
fn minimal_model_produces_three_artifacts() -> Result<()> {
    let test = CliTest::with_files(&[("app/models/user.ts", USER_MODEL)])?;

    let output = test.migrate_command().output()?;
    assert_eq!(output.status.code(), Some(0));

    assert_eq!(
        test.read_file("app/data/resources/user.schema.ts")?,
        "export const UserSchema = {\n\
         \x20 type: 'user',\n\
         \x20 legacy: true,\n\
         \x20 identity: { kind: '@id', name: 'id' },\n\
         \x20 fields: [\n\
         \x20   { name: 'name', kind: 'attribute', type: 'string' },\n\
         \x20   { name: 'email', kind: 'attribute', type: 'string' },\n\
         \x20   { name: 'company', kind: 'belongsTo', type: 'company', options: { async: false } },\n\
         \x20 ],\n\
         \x20 objectExtensions: ['UserExtension'],\n\
         };\n"
    );

    assert_eq!(
        test.read_file("app/data/resources/user.schema.types.ts")?,
        "import { Type } from '@ember-data/core-types/symbols';\n\
         import type { UserExtensionSignature } from 'my-app/data/extensions/user';\n\
         \n\
         export interface User extends UserExtensionSignature {\n\
         \x20 readonly name: string | null;\n\
         \x20 readonly email: string | null;\n\
         \x20 readonly company: unknown | null;\n\
         \x20 readonly [Type]: 'user';\n\
         }\n"
    );

    assert_eq!(
        test.read_file("app/data/extensions/user.ts")?,
        "import type { User } from 'my-app/data/resources/user.schema.types';\n\
         \n\
         export interface UserExtension extends User {}\n\
         export class UserExtension {\n\
         \x20 get displayName() {\n\
         \x20   return `${this.name}`;\n\
         \x20 }\n\
         }\n\
         \n\
         export type UserExtensionSignature = typeof UserExtension;\n"
    );

    Ok(())
}

#[test]
fn disconnected_mixin_emits_nothing() -> Result<()> {
    let test = CliTest::with_files(&[(
        "app/mixins/unused.ts",
        "import Mixin from '@ember/object/mixin';\n\
         \n\
         export default Mixin.create({\n\
         \x20 commonMethod() {\n    return 1;\n  },\n\
         });\n",
    )])?;

    let output = test.migrate_command().output()?;
    assert_eq!(output.status.code(), Some(0));

    assert!(!test.exists("app/data/traits"));
    assert!(!test.exists("app/data"));

    Ok(())
}

#[test]
fn mixed_surface_languages_keep_their_extension() -> Result<()> {
    let test = CliTest::with_files(&[
        (
            "app/models/js-model.js",
            "import Model, { attr } from '@ember-data/model';\n\
             \n\
             export default class JsModel extends Model {\n  @attr('string') name;\n}\n",
        ),
        (
            "app/models/ts-model.ts",
            "import Model, { attr } from '@ember-data/model';\n\
             \n\
             export default class TsModel extends Model {\n  @attr('string') declare name: string;\n}\n",
        ),
    ])?;

    let output = test.migrate_command().output()?;
    assert_eq!(output.status.code(), Some(0));

    assert!(test.exists("app/data/resources/js-model.schema.js"));
    assert!(test.exists("app/data/resources/ts-model.schema.ts"));
    assert!(test.exists("app/data/resources/js-model.schema.types.ts"));
    assert!(test.exists("app/data/resources/ts-model.schema.types.ts"));
    assert!(!test.exists("app/data/resources/js-model.schema.ts"));

    Ok(())
}

#[test]
fn dry_run_creates_no_directories() -> Result<()> {
    let test = CliTest::with_files(&[("app/models/user.ts", USER_MODEL)])?;

    let output = test.migrate_command().arg("--dry-run").output()?;
    assert_eq!(output.status.code(), Some(0));

    assert!(!test.exists("app/data"));
    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.contains("planned 1 resources"));

    Ok(())
}

#[test]
fn intermediate_model_chain() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file(
        ".remodelrc.json",
        r#"{
  "resourcesImport": "my-app/data/resources",
  "traitsImport": "my-app/data/traits",
  "extensionsImport": "my-app/data/extensions",
  "modelImportSource": "my-app/models",
  "mixinImportSource": "my-app/mixins",
  "additionalModelSources": [["my-app/core/*", "./app/core/*"]],
  "intermediateModelPaths": ["my-app/core/base-model"]
}"#,
    )?;
    test.write_file(
        "app/core/base-model.ts",
        "import Model, { attr } from '@ember-data/model';\n\
         \n\
         export default class BaseModel extends Model {\n\
         \x20 @attr('date') declare syncedAt;\n\
         }\n",
    )?;
    test.write_file(
        "app/models/custom.ts",
        "import BaseModel from 'my-app/core/base-model';\n\
         import { attr } from '@ember-data/model';\n\
         \n\
         export default class Custom extends BaseModel {\n\
         \x20 @attr('string') declare title;\n\
         }\n",
    )?;

    let output = test.migrate_command().output()?;
    assert_eq!(output.status.code(), Some(0));

    assert_eq!(
        test.read_file("app/data/traits/base-model.schema.ts")?,
        "export const BaseModelTrait = {\n\
         \x20 name: 'base-model',\n\
         \x20 mode: 'legacy',\n\
         \x20 fields: [\n\
         \x20   { name: 'id', kind: 'attribute', type: 'string' },\n\
         \x20   { name: 'syncedAt', kind: 'attribute', type: 'date' },\n\
         \x20 ],\n\
         };\n"
    );

    let custom = test.read_file("app/data/resources/custom.schema.ts")?;
    assert!(custom.contains("traits: ['base-model'],"));
    assert!(custom.contains("legacy: true,"));

    let custom_types = test.read_file("app/data/resources/custom.schema.types.ts")?;
    assert!(custom_types.contains(
        "import type { BaseModel } from 'my-app/data/traits/base-model.schema.types';"
    ));
    assert!(custom_types.contains("export interface Custom extends BaseModel {"));

    Ok(())
}

#[test]
fn polymorphic_relationship_connects_mixin() -> Result<()> {
    let test = CliTest::with_files(&[
        (
            "app/models/comment.ts",
            "import Model, { belongsTo } from '@ember-data/model';\n\
             \n\
             export default class Comment extends Model {\n\
             \x20 @belongsTo('commentable', { polymorphic: true }) declare target;\n\
             }\n",
        ),
        (
            "app/mixins/commentable.ts",
            "import Mixin from '@ember/object/mixin';\n\
             import { hasMany } from '@ember-data/model';\n\
             \n\
             export default Mixin.create({\n\
             \x20 comments: hasMany('comment', { async: true, inverse: null }),\n\
             });\n",
        ),
    ])?;

    let output = test.migrate_command().output()?;
    assert_eq!(output.status.code(), Some(0));

    let trait_schema = test.read_file("app/data/traits/commentable.schema.ts")?;
    assert!(trait_schema.contains("name: 'commentable',"));
    assert!(trait_schema.contains("mode: 'legacy',"));

    let comment_schema = test.read_file("app/data/resources/comment.schema.ts")?;
    assert!(comment_schema.contains(
        "{ name: 'target', kind: 'belongsTo', type: 'commentable', options: { polymorphic: true } }"
    ));
    // The polymorphic target connects the mixin without composing it.
    assert!(!comment_schema.contains("traits:"));

    // The polymorphic target types against the trait interface.
    let comment_types = test.read_file("app/data/resources/comment.schema.types.ts")?;
    assert!(comment_types.contains("readonly target: Commentable | null;"));
    assert!(comment_types.contains(
        "import type { Commentable } from 'my-app/data/traits/commentable.schema.types';"
    ));

    Ok(())
}

#[test]
fn reruns_are_byte_identical_and_skippable() -> Result<()> {
    let test = CliTest::with_files(&[
        ("app/models/user.ts", USER_MODEL),
        (
            "app/mixins/auditable.ts",
            "import Mixin from '@ember/object/mixin';\n\
             import { attr } from '@ember-data/model';\n\
             \n\
             export default Mixin.create({\n\
             \x20 createdAt: attr('date'),\n\
             });\n",
        ),
        (
            "app/models/post.ts",
            "import Model, { belongsTo } from '@ember-data/model';\n\
             import Auditable from 'my-app/mixins/auditable';\n\
             \n\
             export default class Post extends Model.extend(Auditable) {\n\
             \x20 @belongsTo('user', { async: false, inverse: null }) declare author;\n\
             }\n",
        ),
    ])?;

    assert_eq!(test.migrate_command().output()?.status.code(), Some(0));
    let first = [
        test.read_file("app/data/resources/user.schema.ts")?,
        test.read_file("app/data/resources/post.schema.ts")?,
        test.read_file("app/data/resources/post.schema.types.ts")?,
        test.read_file("app/data/traits/auditable.schema.ts")?,
    ];

    assert_eq!(test.migrate_command().output()?.status.code(), Some(0));
    let second = [
        test.read_file("app/data/resources/user.schema.ts")?,
        test.read_file("app/data/resources/post.schema.ts")?,
        test.read_file("app/data/resources/post.schema.types.ts")?,
        test.read_file("app/data/traits/auditable.schema.ts")?,
    ];
    assert_eq!(first, second);

    let output = test.migrate_command().arg("--skip-processed").output()?;
    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.contains("3 skipped"));
    assert!(stdout.contains("wrote 0 resources, 0 traits, 0 extensions"));

    Ok(())
}

#[test]
fn models_only_and_mixins_only_conflict() -> Result<()> {
    let test = CliTest::with_files(&[("app/models/user.ts", USER_MODEL)])?;

    let output = test
        .migrate_command()
        .args(["--models-only", "--mixins-only"])
        .output()?;
    assert_ne!(output.status.code(), Some(0));

    Ok(())
}

#[test]
fn contradictory_config_file_exits_with_error() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file(
        ".remodelrc.json",
        r#"{ "modelsOnly": true, "mixinsOnly": true }"#,
    )?;

    let output = test.migrate_command().output()?;
    assert_eq!(output.status.code(), Some(2));

    Ok(())
}

#[test]
fn missing_import_prefix_exits_with_error() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file(".remodelrc.json", r#"{ "traitsImport": "my-app/data/traits" }"#)?;
    test.write_file(
        "app/models/user.ts",
        "import Model from '@ember-data/model';\nexport default class User extends Model {}\n",
    )?;

    let output = test.migrate_command().output()?;
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8(output.stderr)?;
    assert!(stderr.contains("resourcesImport"));

    Ok(())
}

#[test]
fn parse_error_warns_but_run_succeeds() -> Result<()> {
    let test = CliTest::with_files(&[
        ("app/models/user.ts", USER_MODEL),
        ("app/models/broken.ts", "export default class {"),
    ])?;

    let output = test.migrate_command().output()?;
    assert_eq!(output.status.code(), Some(0));
    let stderr = String::from_utf8(output.stderr)?;
    assert!(stderr.contains("warning:"));
    assert!(test.exists("app/data/resources/user.schema.ts"));
    assert!(!test.exists("app/data/resources/broken.schema.ts"));

    Ok(())
}

#[test]
fn unknown_config_key_warns() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file(
        ".remodelrc.json",
        r#"{
  "resourcesImport": "my-app/data/resources",
  "traitsImport": "my-app/data/traits",
  "extensionsImport": "my-app/data/extensions",
  "modelImportSource": "my-app/models",
  "mixinImportSource": "my-app/mixins",
  "colour": "green"
}"#,
    )?;

    let output = test.migrate_command().output()?;
    assert_eq!(output.status.code(), Some(0));
    let stderr = String::from_utf8(output.stderr)?;
    assert!(stderr.contains("colour"));

    Ok(())
}

#[test]
fn untyped_model_gets_jsdoc_extension() -> Result<()> {
    let test = CliTest::with_files(&[(
        "app/models/user.js",
        "import Model, { attr } from '@ember-data/model';\n\
         \n\
         export default class User extends Model {\n\
         \x20 @attr('string') name;\n\
         \n\
         \x20 get shoutedName() {\n\
         \x20   return this.name.toUpperCase();\n\
         \x20 }\n\
         }\n",
    )])?;

    let output = test.migrate_command().output()?;
    assert_eq!(output.status.code(), Some(0));

    let extension = test.read_file("app/data/extensions/user.js")?;
    assert!(extension.starts_with(
        "/** @typedef {import('my-app/data/resources/user.schema.types').User} User */\n\
         /** @type {{ new(): User }} */\n\
         const Base = class {};\n"
    ));
    assert!(extension.contains("export class UserExtension extends Base {"));
    assert!(extension.contains("/** @typedef {typeof UserExtension} UserExtensionSignature */"));

    Ok(())
}

#[test]
fn help_lists_commands() -> Result<()> {
    let test = CliTest::new()?;

    let output = test.command().arg("--help").output()?;
    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.contains("migrate"));
    assert!(stdout.contains("init"));

    Ok(())
}
