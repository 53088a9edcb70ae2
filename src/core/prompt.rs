use crate::core::AccountGraph;
use crate::utils::error::Result;

const DATA_START: &str = "--- INICIO DE DATOS DEL CLIENTE ---";
const DATA_END: &str = "--- FIN DE DATOS DEL CLIENTE ---";

/// Builds the free-text prompt for the assistant. Without a resolved client the
/// prompt only asks the customer for an identifier.
pub fn build_prompt(question: &str, graph: &AccountGraph) -> Result<String> {
    if !graph.has_client() {
        return Ok(format!(
            "Por favor, responde amablemente al usuario que para ayudarle, necesito que me proporcione \
             su número de cliente, número de medidor o número de factura. La pregunta original del usuario fue: '{}'",
            question
        ));
    }

    let context = serde_json::to_string_pretty(graph)?;

    Ok(format!(
        "Eres un asistente virtual de atención al cliente para una empresa de agua potable. \
         Tu nombre es AquaBot. Eres amable, servicial y muy preciso. \
         Usa SOLAMENTE la información proporcionada para responder a la pregunta del cliente. \
         No inventes información. Si la respuesta no está en los datos, indica amablemente que no tienes esa información. \
         Dirígete al cliente por su nombre de pila (si está disponible). Responde en español.\n\n\
         Los datos devueltos deben estar organizados de manera legible y clara.\n\n\
         {}\n{}\n{}\n\n\
         Pregunta: {}\n\
         Respuesta:",
        DATA_START, context, DATA_END, question
    ))
}
