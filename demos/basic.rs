use docfilter::*;

fn main() -> Result<(), TranslateError> {
    // 1. Declare the document fields queries may touch
    let schema = DocumentSchemaBuilder::new()
        .field("Name", FieldType::Text)
        .field("Tags", FieldType::array_of(FieldType::Text))
        .field("Address.City", FieldType::Text)
        .build();

    // 2. Map them onto a jsonb column
    let mapping = JsonbMapping::new(schema.clone(), MappingConfig::default());

    // 3. Translate each call node through the shared registry
    let registry = default_registry();
    let mut fragments = Vec::new();
    for src in [
        r#"Name.StartsWith("Sm")"#,
        r#"Address.City.Contains("ville")"#,
        r#"Tags.Contains("blue")"#,
    ] {
        let call = CallParser::parse(src, &schema)?;
        let fragment = registry.translate(&mapping, &JsonSerializer, &call)?;
        println!("{:<32} => {} {:?}", src, fragment.template(), fragment.arguments());
        fragments.push(fragment);
    }

    // 4. Compose into one WHERE clause
    let filter = FilterFragment::and_all(fragments);
    let mut sql = String::from("select d.data from docs as d where ");
    filter.write_sql(&mut sql, 1);
    println!("{}", sql);

    // 5. Unsupported operators surface as errors
    let call = CallParser::parse(r#"Name.EqualsIgnoreCase("x")"#, &schema)?;
    match registry.translate(&mapping, &JsonSerializer, &call) {
        Ok(fragment) => println!("unexpected: {}", fragment.template()),
        Err(e) => println!("Translation error: {}", e),
    }
    Ok(())
}
