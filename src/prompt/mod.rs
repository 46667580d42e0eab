/// Fixed instruction template sent upstream. The model is told to emit
/// exactly three named files as a bare JSON object; the normalizer copes
/// when it does not comply.
pub fn build_instruction(prompt: &str) -> String {
    format!(
        "You are an assistant that outputs a complete simple static website as JSON.\n\
         Create three files: \"index.html\", \"styles.css\", and \"script.js\".\n\
         Return only valid JSON and nothing else.\n\
         User prompt:\n\
         {prompt}"
    )
}
