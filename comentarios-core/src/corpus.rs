//! # Comentários de Demonstração
//!
//! Amostra fixa de comentários sobre o caso Elize Matsunaga, no tom de um
//! fórum (links, risadas, hashtags, menções e pontuação exagerada). É a
//! entrada padrão do binário quando nenhum comentário é informado.

/// Os cinco comentários de demonstração, em ordem.
pub fn demo_comments() -> Vec<&'static str> {
    vec![
        "A Elize Matsunaga agora é motorista de app? 😱 Vi no link https://reddit.com/r/crime kkkkkk #elizematsunaga",
        "Acho um absurdo ela ter saído de Tremembé tão cedo... @justiça_br fiquem de olho!",
        "O documentário da Netflix sobre a Elize é muito bom, mostra detalhes do crime em SP. rsrsrsrs",
        "Gente, não dá pra acreditar que ela está solta. #justiça #truecrimebr kkkk",
        "A empresa Uber deveria banir motoristas com antecedentes criminais graves!!!!!",
    ]
}
